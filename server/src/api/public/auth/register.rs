use crate::accounts::{check_identity_available, map_unique_violation};
use crate::api::ErrorResponse;
use crate::auth::{create_session, hash_password};
use crate::db::DbPool;
use crate::error::ApiError;
use crate::get_conn;
use crate::models::NewUser;
use crate::schema::users;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use platebook_core::validation::RegistrationForm;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body(content = RegisterRequest, example = json!({
        "username": "alice",
        "email": "alice@example.com",
        "password": "secret1",
        "password_confirmation": "secret1"
    })),
    responses(
        (status = 201, description = "Account created and signed in", body = RegisterResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn register(
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let valid = RegistrationForm {
        username: req.username,
        email: req.email,
        password: req.password,
        password_confirmation: req.password_confirmation,
    }
    .validate()?;

    let password_hash = hash_password(&valid.password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::Internal("Failed to hash password")
    })?;

    let mut conn = get_conn!(pool);

    let (user_id, token) = conn.transaction::<_, ApiError, _>(|conn| {
        check_identity_available(conn, &valid.email, &valid.login, "username", None)?;

        let user_id: i64 = diesel::insert_into(users::table)
            .values(NewUser {
                email: &valid.email,
                login: &valid.login,
                password_hash: &password_hash,
                is_staff: false,
            })
            .returning(users::id)
            .get_result(conn)
            .map_err(|e| map_unique_violation(e, "username"))?;

        let token = create_session(conn, user_id)?;
        Ok((user_id, token))
    })?;

    tracing::info!(user_id, "registered new user");

    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id, token })))
}
