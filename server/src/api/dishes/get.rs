use super::store::{self, DishResponse};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::{ensure_allowed, ApiError};
use crate::get_conn;
use axum::{
    extract::{Path, State},
    Json,
};
use diesel::prelude::*;
use platebook_core::policy;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/dishes/{id}",
    tag = "dishes",
    params(
        ("id" = i64, Path, description = "Dish ID")
    ),
    responses(
        (status = 200, description = "Dish details", body = DishResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not your dish", body = ErrorResponse),
        (status = 404, description = "Dish not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_dish(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i64>,
) -> Result<Json<DishResponse>, ApiError> {
    let mut conn = get_conn!(pool);

    let response = conn.transaction::<_, ApiError, _>(|conn| {
        let dish = store::find(conn, id)?.ok_or(ApiError::NotFound("Dish not found"))?;
        ensure_allowed(
            policy::dish(&user.actor(), dish.user_id),
            "You cannot access this dish",
        )?;
        Ok(store::load_response(conn, dish)?)
    })?;

    Ok(Json(response))
}
