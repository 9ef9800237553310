use super::create::DishFormRequest;
use super::form::read_dish_form;
use super::store::{self, DishResponse};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::{ensure_allowed, ApiError};
use crate::get_conn;
use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use diesel::prelude::*;
use platebook_core::policy;
use std::sync::Arc;

#[utoipa::path(
    put,
    path = "/api/dishes/{id}",
    tag = "dishes",
    params(
        ("id" = i64, Path, description = "Dish ID")
    ),
    request_body(content_type = "multipart/form-data", content = DishFormRequest),
    responses(
        (status = 200, description = "Dish replaced", body = DishResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not your dish", body = ErrorResponse),
        (status = 404, description = "Dish not found", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_dish(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<DishResponse>, ApiError> {
    // Refuse before reading a possibly large body. The connection goes back
    // to the pool while the upload streams in.
    {
        let mut conn = get_conn!(pool);
        let existing = store::find(&mut conn, id)?.ok_or(ApiError::NotFound("Dish not found"))?;
        ensure_allowed(
            policy::dish(&user.actor(), existing.user_id),
            "You cannot modify this dish",
        )?;
    }

    let submission = read_dish_form(multipart).await?;
    let valid = submission.form.validate()?;

    let mut conn = get_conn!(pool);
    let response = conn.transaction::<_, ApiError, _>(|conn| {
        // Re-read inside the transaction; it may have been deleted meanwhile
        let existing = store::find(conn, id)?.ok_or(ApiError::NotFound("Dish not found"))?;
        let updated = store::update(conn, &existing, &valid, submission.photo.as_ref())?;
        Ok(store::load_response(conn, updated)?)
    })?;

    tracing::info!(dish_id = id, user_id = user.id, "updated dish");

    Ok(Json(response))
}
