pub mod users;

use crate::AppState;
use axum::routing::{get, put};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for staff-only endpoints (mounted at /api/admin)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/{id}", put(users::update_user))
}

#[derive(OpenApi)]
#[openapi(
    paths(users::list_users, users::create_user, users::update_user),
    components(schemas(
        users::AdminUserRequest,
        users::UserItem,
        users::UsersListResponse,
    ))
)]
pub struct ApiDoc;
