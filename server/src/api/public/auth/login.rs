use crate::api::ErrorResponse;
use crate::auth::{create_session, verify_password};
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::models::User;
use crate::raw_sql::lower;
use crate::schema::users;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

fn invalid_credentials() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new("Invalid credentials")),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body(content = LoginRequest, example = json!({"username": "alice", "password": "secret1"})),
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let mut conn = get_conn!(pool);

    let user: Option<User> = users::table
        .filter(lower(users::login).eq(lower(req.username.trim())))
        .select(User::as_select())
        .first(&mut conn)
        .optional()?;

    let Some(user) = user else {
        return Ok(invalid_credentials());
    };

    if !verify_password(&req.password, &user.password_hash) {
        return Ok(invalid_credentials());
    }

    let token = create_session(&mut conn, user.id)?;

    Ok((StatusCode::OK, Json(LoginResponse { token })).into_response())
}
