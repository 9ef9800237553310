pub mod available;
pub mod create;
pub mod delete;
pub mod list;
pub mod store;
pub mod update;

use crate::AppState;
use axum::routing::{get, put};
use axum::Router;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

/// Body for creating or renaming an allergen.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AllergenRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AllergensListResponse {
    pub allergens: Vec<store::AllergenItem>,
}

/// Returns the router for /api/allergens endpoints (mounted at /api/allergens)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(available::list_available))
        .route(
            "/mine",
            get(list::list_personal).post(create::create_personal),
        )
        .route("/global", get(list::list_global).post(create::create_global))
        .route(
            "/{id}",
            put(update::rename_allergen).delete(delete::delete_allergen),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        available::list_available,
        list::list_personal,
        list::list_global,
        create::create_personal,
        create::create_global,
        update::rename_allergen,
        delete::delete_allergen,
    ),
    components(schemas(AllergenRequest, AllergensListResponse, store::AllergenItem))
)]
pub struct ApiDoc;
