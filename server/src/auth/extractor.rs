use crate::api::ErrorResponse;
use crate::db::DbPool;
use crate::models::User;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::db::get_user_from_token;

/// Extractor that validates the Authorization header and provides the authenticated user.
///
/// Use this in any handler that requires authentication:
/// ```ignore
/// async fn my_handler(AuthUser(user): AuthUser) -> impl IntoResponse {
///     // user is the authenticated User
/// }
/// ```
pub struct AuthUser(pub User);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingHeader,
    InvalidHeader,
    InvalidFormat,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingHeader => "Missing Authorization header",
            AuthError::InvalidHeader => "Invalid Authorization header",
            AuthError::InvalidFormat => "Invalid Authorization header format",
            AuthError::InvalidToken => "Invalid or expired token",
        };

        (StatusCode::UNAUTHORIZED, Json(ErrorResponse::new(message))).into_response()
    }
}

/// The raw token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidHeader)?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidFormat)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<DbPool>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pool = Arc::<DbPool>::from_ref(state);

        let token = bearer_token(&parts.headers)?;

        let user = get_user_from_token(&pool, token)
            .await
            .ok_or(AuthError::InvalidToken)?;

        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Ok("abc"));
        assert_eq!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingHeader)
        );
        assert_eq!(
            bearer_token(&headers("Basic abc")),
            Err(AuthError::InvalidFormat)
        );
        assert_eq!(
            bearer_token(&headers("Bearer ")),
            Err(AuthError::InvalidFormat)
        );
    }
}
