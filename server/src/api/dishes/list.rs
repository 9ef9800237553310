use super::query;
use super::store::{load_allergens, DishResponse};
use crate::api::allergens::store::{load_available, AllergenItem};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use axum::{
    extract::{RawQuery, State},
    Json,
};
use chrono::NaiveDate;
use diesel::prelude::*;
use platebook_core::{DishFilter, Nutrient, NutrientAverages, Page};
use serde::Serialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

/// Query parameters for the dish list. Documentation only: the handler reads
/// the raw query string so `exclude_allergens` may repeat.
#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
#[allow(dead_code)]
pub struct ListDishesParams {
    /// Case-insensitive substring of the dish name
    pub name: Option<String>,
    pub calories_min: Option<f64>,
    pub calories_max: Option<f64>,
    pub proteins_min: Option<f64>,
    pub proteins_max: Option<f64>,
    pub fats_min: Option<f64>,
    pub fats_max: Option<f64>,
    pub carbohydrates_min: Option<f64>,
    pub carbohydrates_max: Option<f64>,
    /// Earliest creation date (YYYY-MM-DD, inclusive, UTC)
    pub created_after: Option<NaiveDate>,
    /// Latest creation date (YYYY-MM-DD, inclusive, UTC)
    pub created_before: Option<NaiveDate>,
    /// Allergen ids to exclude. Repeat the key or separate ids with commas.
    pub exclude_allergens: Option<String>,
    /// name, calories, proteins, fats, carbohydrates or created_at; prefix
    /// with `-` for descending. Default: -created_at
    pub sort_by: Option<String>,
    /// 1-based page number, or `last`
    pub page: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginationResponse {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub num_pages: i64,
}

impl From<Page> for PaginationResponse {
    fn from(page: Page) -> Self {
        PaginationResponse {
            page: page.number,
            per_page: page.per_page,
            total: page.total,
            num_pages: page.num_pages,
        }
    }
}

/// Means over every dish matching the filter (not just this page). Dishes
/// without a value are left out; 0 when none has one.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AveragesResponse {
    pub avg_calories: f64,
    pub avg_proteins: f64,
    pub avg_fats: f64,
    pub avg_carbohydrates: f64,
}

impl From<NutrientAverages> for AveragesResponse {
    fn from(a: NutrientAverages) -> Self {
        AveragesResponse {
            avg_calories: a.calories,
            avg_proteins: a.proteins,
            avg_fats: a.fats,
            avg_carbohydrates: a.carbohydrates,
        }
    }
}

/// The filter as it was understood, with ignored values dropped.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AppliedFilters {
    pub name: Option<String>,
    pub calories_min: Option<f64>,
    pub calories_max: Option<f64>,
    pub proteins_min: Option<f64>,
    pub proteins_max: Option<f64>,
    pub fats_min: Option<f64>,
    pub fats_max: Option<f64>,
    pub carbohydrates_min: Option<f64>,
    pub carbohydrates_max: Option<f64>,
    pub created_after: Option<NaiveDate>,
    pub created_before: Option<NaiveDate>,
    pub exclude_allergens: Vec<i64>,
    pub sort_by: String,
}

impl From<&DishFilter> for AppliedFilters {
    fn from(f: &DishFilter) -> Self {
        let calories = f.range(Nutrient::Calories);
        let proteins = f.range(Nutrient::Proteins);
        let fats = f.range(Nutrient::Fats);
        let carbohydrates = f.range(Nutrient::Carbohydrates);
        AppliedFilters {
            name: f.name.clone(),
            calories_min: calories.min,
            calories_max: calories.max,
            proteins_min: proteins.min,
            proteins_max: proteins.max,
            fats_min: fats.min,
            fats_max: fats.max,
            carbohydrates_min: carbohydrates.min,
            carbohydrates_max: carbohydrates.max,
            created_after: f.created_after,
            created_before: f.created_before,
            exclude_allergens: f.exclude_allergens.clone(),
            sort_by: f.sort.as_param(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListDishesResponse {
    pub dishes: Vec<DishResponse>,
    pub pagination: PaginationResponse,
    pub averages: AveragesResponse,
    pub filters: AppliedFilters,
    /// Allergens the user can filter by or tag with
    pub available_allergens: Vec<AllergenItem>,
}

#[utoipa::path(
    get,
    path = "/api/dishes",
    tag = "dishes",
    params(ListDishesParams),
    responses(
        (status = 200, description = "One page of the user's dishes", body = ListDishesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_dishes(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    RawQuery(raw): RawQuery,
) -> Result<Json<ListDishesResponse>, ApiError> {
    let filter = DishFilter::from_pairs(url::form_urlencoded::parse(
        raw.as_deref().unwrap_or_default().as_bytes(),
    ));

    let mut conn = get_conn!(pool);

    let (listing, mut allergens_by_dish, available) = conn.transaction::<_, ApiError, _>(|conn| {
        let listing = query::list(conn, user.id, &filter)?;
        let ids: Vec<i64> = listing.dishes.iter().map(|d| d.id).collect();
        let allergens_by_dish = load_allergens(conn, &ids)?;
        let available = load_available(conn, user.id)?;
        Ok((listing, allergens_by_dish, available))
    })?;

    let dishes = listing
        .dishes
        .into_iter()
        .map(|dish| {
            let allergens = allergens_by_dish.remove(&dish.id).unwrap_or_default();
            DishResponse::new(dish, allergens)
        })
        .collect();

    Ok(Json(ListDishesResponse {
        dishes,
        pagination: listing.page.into(),
        averages: listing.averages.into(),
        filters: AppliedFilters::from(&filter),
        available_allergens: available.into_iter().map(AllergenItem::from).collect(),
    }))
}
