//! Staff account management.

use crate::accounts::{check_identity_available, map_unique_violation};
use crate::api::ErrorResponse;
use crate::auth::{hash_password, AuthUser};
use crate::db::DbPool;
use crate::error::{ensure_allowed, ApiError};
use crate::get_conn;
use crate::models::{NewUser, User};
use crate::schema::users;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use platebook_core::dish_query::like_pattern;
use platebook_core::policy;
use platebook_core::validation::AdminUserForm;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

const STAFF_ONLY: &str = "Only staff can manage users";

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserItem {
    pub id: i64,
    pub email: String,
    pub login: String,
    pub is_staff: bool,
    pub date_registration: DateTime<Utc>,
}

impl From<User> for UserItem {
    fn from(u: User) -> Self {
        UserItem {
            id: u.id,
            email: u.email,
            login: u.login,
            is_staff: u.is_staff,
            date_registration: u.date_registration,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UsersListResponse {
    pub users: Vec<UserItem>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListUsersParams {
    /// Case-insensitive substring of email or login, or an exact user id
    pub q: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AdminUserRequest {
    pub email: String,
    pub login: String,
    #[serde(default)]
    pub is_staff: bool,
    /// Required on create. On update, omit both password fields to keep the
    /// current password.
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl AdminUserRequest {
    fn into_form(self) -> AdminUserForm {
        AdminUserForm {
            email: self.email,
            login: self.login,
            is_staff: self.is_staff,
            password: self.password,
            confirm_password: self.confirm_password,
        }
    }
}

fn hash(password: Option<&str>) -> Result<Option<String>, ApiError> {
    password
        .map(|p| {
            hash_password(p).map_err(|e| {
                tracing::error!("Failed to hash password: {}", e);
                ApiError::Internal("Failed to hash password")
            })
        })
        .transpose()
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "admin",
    params(ListUsersParams),
    responses(
        (status = 200, description = "Matching users, by id", body = UsersListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Staff only", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_users(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<ListUsersParams>,
) -> Result<Json<UsersListResponse>, ApiError> {
    ensure_allowed(policy::manage_users(&user.actor()), STAFF_ONLY)?;

    let mut conn = get_conn!(pool);

    let mut query = users::table.select(User::as_select()).into_boxed();

    if let Some(q) = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        let pattern = like_pattern(q);
        let text_match = users::email
            .ilike(pattern.clone())
            .or(users::login.ilike(pattern));
        query = match q.parse::<i64>() {
            Ok(id) => query.filter(text_match.or(users::id.eq(id))),
            Err(_) => query.filter(text_match),
        };
    }

    let rows: Vec<User> = query.order(users::id.asc()).load(&mut conn)?;

    Ok(Json(UsersListResponse {
        users: rows.into_iter().map(UserItem::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    tag = "admin",
    request_body = AdminUserRequest,
    responses(
        (status = 201, description = "User created", body = UserItem),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Staff only", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_user(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<AdminUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_allowed(policy::manage_users(&user.actor()), STAFF_ONLY)?;

    let valid = request.into_form().validate(true)?;
    let password_hash =
        hash(valid.password.as_deref())?.ok_or(ApiError::Internal("Password missing"))?;

    let mut conn = get_conn!(pool);

    let created: User = conn.transaction::<_, ApiError, _>(|conn| {
        check_identity_available(conn, &valid.email, &valid.login, "login", None)?;

        diesel::insert_into(users::table)
            .values(NewUser {
                email: &valid.email,
                login: &valid.login,
                password_hash: &password_hash,
                is_staff: valid.is_staff,
            })
            .returning(User::as_returning())
            .get_result(conn)
            .map_err(|e| map_unique_violation(e, "login"))
    })?;

    tracing::info!(user_id = created.id, by = user.id, "staff created user");

    Ok((StatusCode::CREATED, Json(UserItem::from(created))))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = AdminUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserItem),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Staff only", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_user(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i64>,
    Json(request): Json<AdminUserRequest>,
) -> Result<Json<UserItem>, ApiError> {
    ensure_allowed(policy::manage_users(&user.actor()), STAFF_ONLY)?;

    let valid = request.into_form().validate(false)?;
    let password_hash = hash(valid.password.as_deref())?;

    let mut conn = get_conn!(pool);

    let updated: User = conn.transaction::<_, ApiError, _>(|conn| {
        let exists = users::table
            .find(id)
            .select(users::id)
            .first::<i64>(conn)
            .optional()?
            .is_some();
        if !exists {
            return Err(ApiError::NotFound("User not found"));
        }

        check_identity_available(conn, &valid.email, &valid.login, "login", Some(id))?;

        let target = users::table.find(id);
        let updated = match &password_hash {
            Some(password_hash) => diesel::update(target)
                .set((
                    users::email.eq(&valid.email),
                    users::login.eq(&valid.login),
                    users::is_staff.eq(valid.is_staff),
                    users::password_hash.eq(password_hash),
                ))
                .returning(User::as_returning())
                .get_result(conn),
            None => diesel::update(target)
                .set((
                    users::email.eq(&valid.email),
                    users::login.eq(&valid.login),
                    users::is_staff.eq(valid.is_staff),
                ))
                .returning(User::as_returning())
                .get_result(conn),
        };
        updated.map_err(|e| map_unique_violation(e, "login"))
    })?;

    tracing::info!(user_id = id, by = user.id, "staff updated user");

    Ok(Json(UserItem::from(updated)))
}
