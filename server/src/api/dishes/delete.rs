use super::store;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::{ensure_allowed, ApiError};
use crate::get_conn;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use platebook_core::policy;
use std::sync::Arc;

#[utoipa::path(
    delete,
    path = "/api/dishes/{id}",
    tag = "dishes",
    params(
        ("id" = i64, Path, description = "Dish ID")
    ),
    responses(
        (status = 204, description = "Dish, its allergen links and photo deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not your dish", body = ErrorResponse),
        (status = 404, description = "Dish not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_dish(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let mut conn = get_conn!(pool);

    conn.transaction::<_, ApiError, _>(|conn| {
        let dish = store::find(conn, id)?.ok_or(ApiError::NotFound("Dish not found"))?;
        ensure_allowed(
            policy::dish(&user.actor(), dish.user_id),
            "You cannot delete this dish",
        )?;
        store::delete(conn, &dish)?;
        Ok(())
    })?;

    tracing::info!(dish_id = id, user_id = user.id, "deleted dish");

    Ok(StatusCode::NO_CONTENT)
}
