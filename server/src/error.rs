use crate::api::{ErrorResponse, FieldErrorBody};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use platebook_core::{Permission, ValidationErrors};
use thiserror::Error;

/// Error returned by handlers. Every variant maps to one status code and an
/// [`ErrorResponse`] body; database and internal failures are logged here.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    UnprocessableEntity(String),

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(errors) => ErrorResponse {
                error: "Validation failed".to_string(),
                fields: errors
                    .into_errors()
                    .into_iter()
                    .map(|e| FieldErrorBody {
                        field: e.field,
                        message: e.message,
                    })
                    .collect(),
            },
            ApiError::Database(e) => {
                tracing::error!(error = %e, "database query failed");
                ErrorResponse::new("Database error")
            }
            ApiError::Internal(message) => {
                tracing::error!("{}", message);
                ErrorResponse::new(message)
            }
            other => ErrorResponse::new(other.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

/// Turn a policy decision into `Ok(())` or a 403 carrying `message`.
pub fn ensure_allowed(permission: Permission, message: &'static str) -> Result<(), ApiError> {
    if permission.is_allowed() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::from(ValidationErrors::field("name", "x")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Forbidden("no").status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("no").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(diesel::result::Error::NotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_ensure_allowed() {
        assert!(ensure_allowed(Permission::Allow, "no").is_ok());
        assert!(matches!(
            ensure_allowed(Permission::Deny, "no"),
            Err(ApiError::Forbidden("no"))
        ));
    }
}
