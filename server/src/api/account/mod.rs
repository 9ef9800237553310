pub mod logout;
pub mod profile;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for the signed-in user's own account
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/logout", post(logout::logout))
        .route("/api/profile", get(profile::get_profile))
}

#[derive(OpenApi)]
#[openapi(
    paths(logout::logout, profile::get_profile),
    components(schemas(profile::ProfileResponse))
)]
pub struct ApiDoc;
