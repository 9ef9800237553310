use super::store::AllergenItem;
use super::AllergensListResponse;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::{ensure_allowed, ApiError};
use crate::get_conn;
use crate::models::Allergen;
use crate::raw_sql::lower;
use crate::schema::allergens;
use axum::{extract::State, Json};
use diesel::prelude::*;
use platebook_core::policy;
use std::sync::Arc;

fn respond(rows: Vec<Allergen>) -> Json<AllergensListResponse> {
    Json(AllergensListResponse {
        allergens: rows.into_iter().map(AllergenItem::from).collect(),
    })
}

#[utoipa::path(
    get,
    path = "/api/allergens/mine",
    tag = "allergens",
    responses(
        (status = 200, description = "The user's personal allergens", body = AllergensListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_personal(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<AllergensListResponse>, ApiError> {
    let mut conn = get_conn!(pool);

    let rows = allergens::table
        .filter(allergens::is_global.eq(false))
        .filter(allergens::created_by.eq(user.id))
        .order((lower(allergens::name).asc(), allergens::id.asc()))
        .select(Allergen::as_select())
        .load(&mut conn)?;

    Ok(respond(rows))
}

#[utoipa::path(
    get,
    path = "/api/allergens/global",
    tag = "allergens",
    responses(
        (status = 200, description = "All global allergens", body = AllergensListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Staff only", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_global(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<AllergensListResponse>, ApiError> {
    ensure_allowed(
        policy::create_global_allergen(&user.actor()),
        "Only staff can manage global allergens",
    )?;

    let mut conn = get_conn!(pool);

    let rows = allergens::table
        .filter(allergens::is_global.eq(true))
        .order((lower(allergens::name).asc(), allergens::id.asc()))
        .select(Allergen::as_select())
        .load(&mut conn)?;

    Ok(respond(rows))
}
