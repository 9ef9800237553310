use super::store::{self, AllergenItem};
use super::AllergenRequest;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::{ensure_allowed, ApiError};
use crate::get_conn;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use platebook_core::validation::clean_allergen_name;
use platebook_core::{policy, AllergenScope};
use std::sync::Arc;

async fn create(
    pool: &DbPool,
    scope: AllergenScope,
    raw_name: &str,
) -> Result<impl IntoResponse, ApiError> {
    let name = clean_allergen_name(raw_name)?;

    let mut conn = get_conn!(pool);
    let allergen = conn.transaction(|conn| store::insert(conn, scope, &name))?;

    tracing::info!(
        allergen_id = allergen.id,
        is_global = allergen.is_global,
        "created allergen"
    );

    Ok((StatusCode::CREATED, Json(AllergenItem::from(allergen))))
}

#[utoipa::path(
    post,
    path = "/api/allergens/mine",
    tag = "allergens",
    request_body = AllergenRequest,
    responses(
        (status = 201, description = "Personal allergen created", body = AllergenItem),
        (status = 400, description = "Empty or duplicate name", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_personal(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<AllergenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = AllergenScope::Personal {
        owner: Some(user.id),
    };
    create(&pool, scope, &request.name).await
}

#[utoipa::path(
    post,
    path = "/api/allergens/global",
    tag = "allergens",
    request_body = AllergenRequest,
    responses(
        (status = 201, description = "Global allergen created", body = AllergenItem),
        (status = 400, description = "Empty or duplicate name", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Staff only", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_global(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<AllergenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_allowed(
        policy::create_global_allergen(&user.actor()),
        "Only staff can manage global allergens",
    )?;
    create(&pool, AllergenScope::Global, &request.name).await
}
