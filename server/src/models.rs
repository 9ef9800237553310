use chrono::{DateTime, Utc};
use diesel::prelude::*;
use platebook_core::{Actor, AllergenScope, Nutrients};
use uuid::Uuid;

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i64,
    pub email: String,
    pub login: String,
    pub password_hash: String,
    pub date_registration: DateTime<Utc>,
    pub is_staff: bool,
}

impl User {
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.id,
            is_staff: self.is_staff,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub login: &'a str,
    pub password_hash: &'a str,
    pub is_staff: bool,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::sessions)]
pub struct NewSession<'a> {
    pub user_id: i64,
    pub token_hash: &'a str,
    pub expires_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::allergens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Allergen {
    pub id: i64,
    pub name: String,
    pub is_global: bool,
    pub created_by: Option<i64>,
}

impl Allergen {
    pub fn scope(&self) -> AllergenScope {
        AllergenScope::from_row(self.is_global, self.created_by)
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::allergens)]
pub struct NewAllergen<'a> {
    pub name: &'a str,
    pub is_global: bool,
    pub created_by: Option<i64>,
}

/// Column order matches `schema::dishes` so boxed queries over all columns
/// load straight into this struct.
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::dishes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Dish {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub calories: Option<f64>,
    pub proteins: Option<f64>,
    pub fats: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub url: Option<String>,
    pub photo_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::dishes)]
pub struct NewDish<'a> {
    pub user_id: i64,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub calories: Option<f64>,
    pub proteins: Option<f64>,
    pub fats: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub url: Option<&'a str>,
    pub photo_id: Option<Uuid>,
}

/// Full replacement of a dish's editable fields. `None` clears the column.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::dishes)]
#[diesel(treat_none_as_null = true)]
pub struct DishChanges<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub calories: Option<f64>,
    pub proteins: Option<f64>,
    pub fats: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub url: Option<&'a str>,
}

impl<'a> DishChanges<'a> {
    pub fn new(
        name: &'a str,
        description: Option<&'a str>,
        nutrients: Nutrients,
        url: Option<&'a str>,
    ) -> Self {
        DishChanges {
            name,
            description,
            calories: nutrients.calories,
            proteins: nutrients.proteins,
            fats: nutrients.fats,
            carbohydrates: nutrients.carbohydrates,
            url,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::dish_allergens)]
pub struct NewDishAllergen {
    pub dish_id: i64,
    pub allergen_id: i64,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::photos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Photo {
    pub id: Uuid,
    pub user_id: i64,
    pub content_type: String,
    pub filename: String,
    pub data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::photos)]
pub struct NewPhoto<'a> {
    pub user_id: i64,
    pub content_type: &'a str,
    pub filename: &'a str,
    pub data: &'a [u8],
}
