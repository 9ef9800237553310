use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::schema::{allergens, dishes};
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub id: i64,
    pub email: String,
    pub login: String,
    pub date_registration: DateTime<Utc>,
    pub is_staff: bool,
    /// Number of dishes the user owns
    pub dish_count: i64,
    /// Number of personal allergens the user created
    pub allergen_count: i64,
}

#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "account",
    responses(
        (status = 200, description = "The signed-in user's profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_profile(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let mut conn = get_conn!(pool);

    let (dish_count, allergen_count) = conn.transaction::<_, ApiError, _>(|conn| {
        let dish_count: i64 = dishes::table
            .filter(dishes::user_id.eq(user.id))
            .count()
            .get_result(conn)?;
        let allergen_count: i64 = allergens::table
            .filter(allergens::created_by.eq(user.id))
            .filter(allergens::is_global.eq(false))
            .count()
            .get_result(conn)?;
        Ok((dish_count, allergen_count))
    })?;

    Ok(Json(ProfileResponse {
        id: user.id,
        email: user.email,
        login: user.login,
        date_registration: user.date_registration,
        is_staff: user.is_staff,
        dish_count,
        allergen_count,
    }))
}
