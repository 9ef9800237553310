use super::store;
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::error::{ensure_allowed, ApiError};
use crate::get_conn;
use crate::schema::allergens;
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use platebook_core::policy;
use std::sync::Arc;

#[utoipa::path(
    delete,
    path = "/api/allergens/{id}",
    tag = "allergens",
    params(
        ("id" = i64, Path, description = "Allergen ID")
    ),
    responses(
        (status = 204, description = "Allergen deleted and removed from every dish"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not allowed to modify this allergen", body = ErrorResponse),
        (status = 404, description = "Allergen not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_allergen(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let mut conn = get_conn!(pool);

    conn.transaction::<_, ApiError, _>(|conn| {
        let allergen = store::find(conn, id)?.ok_or(ApiError::NotFound("Allergen not found"))?;
        ensure_allowed(
            policy::allergen(&user.actor(), allergen.scope()),
            "You cannot modify this allergen",
        )?;

        // dish_allergens rows cascade
        diesel::delete(allergens::table.find(allergen.id)).execute(conn)?;
        Ok(())
    })?;

    tracing::info!(allergen_id = id, "deleted allergen");

    Ok(StatusCode::NO_CONTENT)
}
