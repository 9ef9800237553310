use super::form::{read_dish_form, UploadedPhoto};
use super::store;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Multipart body for creating or replacing a dish.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct DishFormRequest {
    pub name: String,
    pub description: Option<String>,
    pub calories: Option<String>,
    pub proteins: Option<String>,
    pub fats: Option<String>,
    pub carbohydrates: Option<String>,
    /// http(s) link to a recipe
    pub url: Option<String>,
    /// Allergen ids; repeat the field for several
    pub allergens: Vec<String>,
    /// JPEG, PNG, GIF or WebP, at most 5MB
    #[schema(value_type = Option<String>, format = Binary)]
    pub photo: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateDishResponse {
    pub id: i64,
}

#[utoipa::path(
    post,
    path = "/api/dishes",
    tag = "dishes",
    request_body(content_type = "multipart/form-data", content = DishFormRequest),
    responses(
        (status = 201, description = "Dish created", body = CreateDishResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_dish(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let submission = read_dish_form(multipart).await?;
    let valid = submission.form.validate()?;
    let photo: Option<&UploadedPhoto> = submission.photo.as_ref();

    let mut conn = get_conn!(pool);
    let dish = conn.transaction(|conn| store::create(conn, user.id, &valid, photo))?;

    tracing::info!(dish_id = dish.id, user_id = user.id, "created dish");

    Ok((StatusCode::CREATED, Json(CreateDishResponse { id: dish.id })))
}
