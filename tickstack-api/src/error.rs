/// Error handling for the API server
///
/// One error type, one wire shape. Every handler returns
/// `Result<T, ApiError>`; the `IntoResponse` impl maps each variant to its
/// HTTP status and renders the uniform envelope
/// `{"error": <code>, "message": <text>, "details": [...]?, "errors": [...]?}`.
///
/// Status conventions:
/// - request-shape/validation failures → 400 with per-field details
/// - bad credentials → 401
/// - lockout, bad one-time codes, wrong old password, quota → 403
/// - missing users/lists/items → 404
/// - duplicate email at registration → 409
/// - store failures that surface their error list → 500 with `errors`
/// - everything else internal → 500, detail logged but not exposed

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use tickstack_shared::auth::{
    jwt::JwtError, password::PasswordError, signin::SignInError,
};
use tickstack_shared::email::EmailError;
use tickstack_shared::quota::QuotaError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Request-shape validation failure (400 with field details)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403) - lockout, bad codes, wrong old password, quota
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - duplicate email
    Conflict(String),

    /// Store operation failed (500 with the store's error list)
    OperationFailed(Vec<String>),

    /// Internal server error (500, detail hidden)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Per-field validation details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,

    /// Store-reported error list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::OperationFailed(errors) => {
                write!(f, "Operation failed: {}", errors.join("; "))
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details, errors) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None, None),
            ApiError::ValidationError(details) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request validation failed".to_string(),
                Some(details),
                None,
            ),
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg, None, None)
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None, None),
            ApiError::OperationFailed(errors) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "operation_failed",
                "The operation could not be completed".to_string(),
                None,
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
            errors,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::Conflict("Email already exists".to_string());
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert validator failures to the 400 field-error map
impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        let details: Vec<ValidationErrorDetail> = e
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        ApiError::ValidationError(details)
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert token errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::WrongConsumer => {
                ApiError::Unauthorized("Invalid token issuer or audience".to_string())
            }
            JwtError::CreateError(msg) => {
                ApiError::InternalError(format!("Token creation failed: {}", msg))
            }
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

/// Convert sign-in errors to API errors
impl From<SignInError> for ApiError {
    fn from(err: SignInError) -> Self {
        match err {
            SignInError::Database(e) => e.into(),
            SignInError::Password(e) => e.into(),
        }
    }
}

/// Convert quota errors to API errors
impl From<QuotaError> for ApiError {
    fn from(err: QuotaError) -> Self {
        match err {
            QuotaError::LimitExceeded { limit, .. } => ApiError::Forbidden(format!(
                "FREE accounts are limited to {} lists. Upgrade to PRO for unlimited lists.",
                limit
            )),
            QuotaError::DatabaseError(e) => e.into(),
        }
    }
}

/// Convert email errors to API errors
///
/// Only reached when a handler chooses to surface a send failure; the
/// account flows log and continue instead.
impl From<EmailError> for ApiError {
    fn from(err: EmailError) -> Self {
        ApiError::InternalError(format!("Email delivery failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("User not found.".to_string());
        assert_eq!(err.to_string(), "Not found: User not found.");
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::ValidationError(vec![]),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                ApiError::OperationFailed(vec!["x".into()]),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::InternalError("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_quota_error_maps_to_forbidden() {
        let err: ApiError = QuotaError::LimitExceeded {
            limit: 5,
            current: 5,
        }
        .into();

        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_validation_error_detail_list() {
        let errors = vec![
            ValidationErrorDetail {
                field: "email".to_string(),
                message: "Invalid email format".to_string(),
            },
            ValidationErrorDetail {
                field: "password".to_string(),
                message: "Password too short".to_string(),
            },
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }
}
