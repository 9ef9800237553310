use super::store;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::{ensure_allowed, ApiError};
use crate::get_conn;
use crate::models::{Photo, User};
use crate::photos::{
    generate_thumbnail, ThumbnailError, DEFAULT_THUMBNAIL_SIZE, MAX_THUMBNAIL_SIZE,
};
use crate::schema::photos;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use diesel::prelude::*;
use platebook_core::policy;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ThumbnailParams {
    /// Longest edge in pixels. Clamped to 1..=800; anything that is not an
    /// integer means the default, 200.
    pub size: Option<String>,
}

impl ThumbnailParams {
    fn size(&self) -> u32 {
        match self.size.as_deref().map(str::trim).map(str::parse::<i64>) {
            Some(Ok(size)) => size.clamp(1, i64::from(MAX_THUMBNAIL_SIZE)) as u32,
            _ => DEFAULT_THUMBNAIL_SIZE,
        }
    }
}

/// The photo of dish `id`, after the same checks as viewing the dish.
fn load_photo(conn: &mut PgConnection, user: &User, id: i64) -> Result<Photo, ApiError> {
    let dish = store::find(conn, id)?.ok_or(ApiError::NotFound("Dish not found"))?;
    ensure_allowed(
        policy::dish(&user.actor(), dish.user_id),
        "You cannot access this dish",
    )?;
    let photo_id = dish.photo_id.ok_or(ApiError::NotFound("Dish has no photo"))?;

    photos::table
        .find(photo_id)
        .select(Photo::as_select())
        .first(conn)
        .optional()?
        .ok_or(ApiError::NotFound("Dish has no photo"))
}

#[utoipa::path(
    get,
    path = "/api/dishes/{id}/photo",
    tag = "dishes",
    params(
        ("id" = i64, Path, description = "Dish ID")
    ),
    responses(
        (status = 200, description = "The uploaded photo, with its declared content type"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not your dish", body = ErrorResponse),
        (status = 404, description = "Dish or photo not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_dish_photo(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn!(pool);
    let photo = load_photo(&mut conn, &user, id)?;

    Ok((
        [
            (header::CONTENT_TYPE, photo.content_type),
            (header::CACHE_CONTROL, "private, max-age=3600".to_string()),
        ],
        photo.data,
    ))
}

#[utoipa::path(
    get,
    path = "/api/dishes/{id}/photo/thumbnail",
    tag = "dishes",
    params(
        ("id" = i64, Path, description = "Dish ID"),
        ThumbnailParams,
    ),
    responses(
        (status = 200, description = "JPEG thumbnail", content_type = "image/jpeg"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not your dish", body = ErrorResponse),
        (status = 404, description = "Dish or photo not found", body = ErrorResponse),
        (status = 422, description = "Stored photo could not be decoded", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_dish_thumbnail(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i64>,
    Query(params): Query<ThumbnailParams>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_conn!(pool);
    let photo = load_photo(&mut conn, &user, id)?;
    drop(conn);

    let size = params.size();
    let data = photo.data;
    let thumbnail = tokio::task::spawn_blocking(move || generate_thumbnail(&data, size))
        .await
        .map_err(|e| {
            tracing::error!("Thumbnail task failed: {}", e);
            ApiError::Internal("Failed to generate thumbnail")
        })?
        .map_err(|e| match e {
            ThumbnailError::Encode(_) => {
                tracing::error!(photo_id = %photo.id, "{}", e);
                ApiError::Internal("Failed to generate thumbnail")
            }
            other => {
                tracing::warn!(photo_id = %photo.id, "{}", other);
                ApiError::UnprocessableEntity(other.to_string())
            }
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CACHE_CONTROL, "private, max-age=3600"),
        ],
        thumbnail,
    ))
}
