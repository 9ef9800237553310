//! Dish persistence shared by the dish handlers.

use super::form::UploadedPhoto;
use crate::api::allergens::store::AllergenItem;
use crate::error::ApiError;
use crate::models::{Allergen, Dish, DishChanges, NewDish, NewDishAllergen, NewPhoto};
use crate::raw_sql::lower;
use crate::schema::{allergens, dish_allergens, dishes, photos};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use platebook_core::validation::ValidDish;
use platebook_core::ValidationErrors;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DishResponse {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub calories: Option<f64>,
    pub proteins: Option<f64>,
    pub fats: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub url: Option<String>,
    /// Whether `GET /api/dishes/{id}/photo` has anything to serve
    pub has_photo: bool,
    pub created_at: DateTime<Utc>,
    /// Tagged allergens, by name
    pub allergens: Vec<AllergenItem>,
}

impl DishResponse {
    pub fn new(dish: Dish, allergens: Vec<AllergenItem>) -> Self {
        DishResponse {
            id: dish.id,
            user_id: dish.user_id,
            name: dish.name,
            description: dish.description,
            calories: dish.calories,
            proteins: dish.proteins,
            fats: dish.fats,
            carbohydrates: dish.carbohydrates,
            url: dish.url,
            has_photo: dish.photo_id.is_some(),
            created_at: dish.created_at,
            allergens,
        }
    }
}

pub fn find(conn: &mut PgConnection, id: i64) -> QueryResult<Option<Dish>> {
    dishes::table
        .find(id)
        .select(Dish::as_select())
        .first(conn)
        .optional()
}

/// Allergens tagged on each of `dish_ids`, sorted by name. Dishes without
/// tags are absent from the map.
pub fn load_allergens(
    conn: &mut PgConnection,
    dish_ids: &[i64],
) -> QueryResult<HashMap<i64, Vec<AllergenItem>>> {
    if dish_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i64, Allergen)> = dish_allergens::table
        .inner_join(allergens::table)
        .filter(dish_allergens::dish_id.eq_any(dish_ids))
        .order((lower(allergens::name).asc(), allergens::id.asc()))
        .select((dish_allergens::dish_id, Allergen::as_select()))
        .load(conn)?;

    let mut by_dish: HashMap<i64, Vec<AllergenItem>> = HashMap::new();
    for (dish_id, allergen) in rows {
        by_dish.entry(dish_id).or_default().push(allergen.into());
    }
    Ok(by_dish)
}

pub fn load_response(conn: &mut PgConnection, dish: Dish) -> QueryResult<DishResponse> {
    let allergens = load_allergens(conn, &[dish.id])?
        .remove(&dish.id)
        .unwrap_or_default();
    Ok(DishResponse::new(dish, allergens))
}

/// Every id must name a global allergen or a personal one of `owner_id`.
fn check_allergen_choices(
    conn: &mut PgConnection,
    owner_id: i64,
    ids: &[i64],
) -> Result<(), ApiError> {
    if ids.is_empty() {
        return Ok(());
    }

    let available: i64 = allergens::table
        .filter(allergens::id.eq_any(ids))
        .filter(
            allergens::is_global
                .eq(true)
                .or(allergens::created_by.eq(owner_id)),
        )
        .count()
        .get_result(conn)?;

    if available != ids.len() as i64 {
        return Err(ValidationErrors::field(
            "allergens",
            "Select a valid choice. One or more of the selected allergens is not available.",
        )
        .into());
    }
    Ok(())
}

fn replace_allergens(conn: &mut PgConnection, dish_id: i64, ids: &[i64]) -> QueryResult<()> {
    diesel::delete(dish_allergens::table.filter(dish_allergens::dish_id.eq(dish_id)))
        .execute(conn)?;

    if !ids.is_empty() {
        let links: Vec<NewDishAllergen> = ids
            .iter()
            .map(|&allergen_id| NewDishAllergen {
                dish_id,
                allergen_id,
            })
            .collect();
        diesel::insert_into(dish_allergens::table)
            .values(&links)
            .execute(conn)?;
    }
    Ok(())
}

fn insert_photo(conn: &mut PgConnection, owner_id: i64, photo: &UploadedPhoto) -> QueryResult<Uuid> {
    diesel::insert_into(photos::table)
        .values(NewPhoto {
            user_id: owner_id,
            content_type: &photo.content_type,
            filename: &photo.filename,
            data: &photo.data,
        })
        .returning(photos::id)
        .get_result(conn)
}

/// Insert a dish for `owner_id` with its photo and allergen links.
/// Call inside a transaction.
pub fn create(
    conn: &mut PgConnection,
    owner_id: i64,
    dish: &ValidDish,
    photo: Option<&UploadedPhoto>,
) -> Result<Dish, ApiError> {
    check_allergen_choices(conn, owner_id, &dish.allergen_ids)?;

    let photo_id = photo
        .map(|p| insert_photo(conn, owner_id, p))
        .transpose()?;

    let created: Dish = diesel::insert_into(dishes::table)
        .values(NewDish {
            user_id: owner_id,
            name: &dish.name,
            description: dish.description.as_deref(),
            calories: dish.nutrients.calories,
            proteins: dish.nutrients.proteins,
            fats: dish.nutrients.fats,
            carbohydrates: dish.nutrients.carbohydrates,
            url: dish.url.as_deref(),
            photo_id,
        })
        .returning(Dish::as_returning())
        .get_result(conn)?;

    replace_allergens(conn, created.id, &dish.allergen_ids)?;
    Ok(created)
}

/// Replace every editable field of `existing`. A new photo replaces (and
/// deletes) the old one; no photo keeps it. Call inside a transaction.
pub fn update(
    conn: &mut PgConnection,
    existing: &Dish,
    dish: &ValidDish,
    photo: Option<&UploadedPhoto>,
) -> Result<Dish, ApiError> {
    check_allergen_choices(conn, existing.user_id, &dish.allergen_ids)?;

    let changes = DishChanges::new(
        &dish.name,
        dish.description.as_deref(),
        dish.nutrients,
        dish.url.as_deref(),
    );

    let mut updated: Dish = diesel::update(dishes::table.find(existing.id))
        .set(&changes)
        .returning(Dish::as_returning())
        .get_result(conn)?;

    if let Some(photo) = photo {
        let photo_id = insert_photo(conn, existing.user_id, photo)?;
        updated = diesel::update(dishes::table.find(existing.id))
            .set(dishes::photo_id.eq(photo_id))
            .returning(Dish::as_returning())
            .get_result(conn)?;
        if let Some(old) = existing.photo_id {
            diesel::delete(photos::table.find(old)).execute(conn)?;
        }
    }

    replace_allergens(conn, existing.id, &dish.allergen_ids)?;
    Ok(updated)
}

/// Delete a dish, its allergen links and its photo. Call inside a transaction.
pub fn delete(conn: &mut PgConnection, dish: &Dish) -> QueryResult<()> {
    diesel::delete(dishes::table.find(dish.id)).execute(conn)?;
    if let Some(photo_id) = dish.photo_id {
        diesel::delete(photos::table.find(photo_id)).execute(conn)?;
    }
    Ok(())
}
