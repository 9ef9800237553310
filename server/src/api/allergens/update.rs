use super::store::{self, AllergenItem};
use super::AllergenRequest;
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
use platebook_core::validation::clean_allergen_name;
use std::sync::Arc;

#[utoipa::path(
    put,
    path = "/api/allergens/{id}",
    tag = "allergens",
    params(
        ("id" = i64, Path, description = "Allergen ID")
    ),
    request_body = AllergenRequest,
    responses(
        (status = 200, description = "Allergen renamed", body = AllergenItem),
        (status = 400, description = "Empty or duplicate name", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not allowed to modify this allergen", body = ErrorResponse),
        (status = 404, description = "Allergen not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn rename_allergen(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i64>,
    Json(request): Json<AllergenRequest>,
) -> Result<Json<AllergenItem>, ApiError> {
    let mut conn = get_conn!(pool);

    let allergen = conn.transaction::<_, ApiError, _>(|conn| {
        let allergen = store::find(conn, id)?.ok_or(ApiError::NotFound("Allergen not found"))?;
        ensure_allowed(
            policy::allergen(&user.actor(), allergen.scope()),
            "You cannot modify this allergen",
        )?;

        let name = clean_allergen_name(&request.name)?;
        store::rename(conn, &allergen, &name)
    })?;

    Ok(Json(AllergenItem::from(allergen)))
}
