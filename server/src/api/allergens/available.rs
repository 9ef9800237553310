use super::store::{load_available, AllergenItem};
use super::AllergensListResponse;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use axum::{extract::State, Json};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/allergens",
    tag = "allergens",
    responses(
        (status = 200, description = "Global allergens and the user's own, by name", body = AllergensListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_available(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<AllergensListResponse>, ApiError> {
    let mut conn = get_conn!(pool);
    let allergens = load_available(&mut conn, user.id)?;

    Ok(Json(AllergensListResponse {
        allergens: allergens.into_iter().map(AllergenItem::from).collect(),
    }))
}
