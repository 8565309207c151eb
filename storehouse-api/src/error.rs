/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>`; every error body has the shape
/// `{"success": false, "error": "<code>", "message": "<text>"}`.
///
/// # Example
///
/// ```
/// use storehouse_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::{json, Value};
///
/// async fn handler(name: String) -> ApiResult<Json<Value>> {
///     if name.is_empty() {
///         return Err(ApiError::BadRequest("Name is required".to_string()));
///     }
///     Ok(Json(json!({ "success": true, "name": name })))
/// }
/// ```

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use storehouse_shared::{
    auth::{authorization::AuthzError, jwt::JwtError, middleware::AuthError, password::PasswordError},
    models::order::InvalidOrderStatus,
    payment::{CartError, PaymentError},
};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Message returned for every 500 that carries no caller-facing text
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong";

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate email
    Conflict(String),

    /// Validation errors (400); the first detail becomes the message
    ValidationError(Vec<ValidationErrorDetail>),

    /// Card declined by the payment gateway (400)
    PaymentDeclined(String),

    /// Internal server error (500); the detail is logged, never returned
    InternalError(String),

    /// Internal server error (500) with a fixed caller-facing message
    InternalErrorWithMessage { message: String, detail: String },

    /// Service unavailable (503)
    ServiceUnavailable(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,

    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// Converts `validator` output, ordering details by `field_order`
    ///
    /// Fields missing from `field_order` sort last, by name.
    pub fn from_validation(errors: validator::ValidationErrors, field_order: &[&str]) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
            .collect();

        details.sort_by_key(|d| {
            let rank = field_order
                .iter()
                .position(|f| *f == d.field)
                .unwrap_or(field_order.len());
            (rank, d.field.clone())
        });

        ApiError::ValidationError(details)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::PaymentDeclined(msg) => write!(f, "Payment declined: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::InternalErrorWithMessage { detail, .. } => {
                write!(f, "Internal error: {}", detail)
            }
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                errors
                    .first()
                    .map(|e| e.message.clone())
                    .unwrap_or_else(|| "Request validation failed".to_string()),
                Some(errors),
            ),
            ApiError::PaymentDeclined(msg) => {
                (StatusCode::BAD_REQUEST, "payment_declined", msg, None)
            }
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    INTERNAL_ERROR_MESSAGE.to_string(),
                    None,
                )
            }
            ApiError::InternalErrorWithMessage { message, detail } => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    message,
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg,
                None,
            ),
        };

        let body = Json(ErrorResponse {
            success: false,
            error: error_code.to_string(),
            message,
            details,
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
                if db_err.is_unique_violation() {
                    return match db_err.constraint() {
                        Some("users_email_key") => {
                            ApiError::Conflict("Already Register please login".to_string())
                        }
                        Some("categories_name_key") => {
                            ApiError::Conflict("Category already exists".to_string())
                        }
                        Some(constraint) => {
                            ApiError::Conflict(format!("Constraint violation: {}", constraint))
                        }
                        None => ApiError::Conflict("Resource already exists".to_string()),
                    };
                }

                if db_err.is_foreign_key_violation() {
                    return match db_err.constraint() {
                        Some("products_category_id_fkey") => ApiError::Conflict(
                            "Category still has products".to_string(),
                        ),
                        Some("order_products_product_id_fkey") => ApiError::Conflict(
                            "Product has been ordered".to_string(),
                        ),
                        _ => ApiError::Conflict("Resource is still referenced".to_string()),
                    };
                }

                if db_err.is_check_violation() {
                    return ApiError::BadRequest(format!(
                        "Invalid value ({})",
                        db_err.constraint().unwrap_or("check")
                    ));
                }

                // Other database errors are internal
                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert bearer authentication errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

/// Convert authorization errors to API errors
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotAdmin => ApiError::Unauthorized(err.to_string()),
            AuthzError::DatabaseError(e) => ApiError::InternalErrorWithMessage {
                message: "Error in admin middleware".to_string(),
                detail: format!("Admin lookup failed: {}", e),
            },
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::EmptyPassword => ApiError::BadRequest(err.to_string()),
            _ => ApiError::InternalError(format!("Password operation failed: {}", err)),
        }
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(_) => {
                ApiError::InternalError(format!("Token creation failed: {}", err))
            }
            _ => ApiError::Unauthorized("Invalid or expired token".to_string()),
        }
    }
}

/// Convert payment gateway failures to API errors
impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        ApiError::InternalError(format!("Payment gateway error: {}", err))
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<InvalidOrderStatus> for ApiError {
    fn from(err: InvalidOrderStatus) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

/// Convert multipart parsing errors to API errors
///
/// A body over the route limit can only be an oversized photo.
impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::BadRequest("Photo should be less than 1MB".to_string())
        } else {
            ApiError::BadRequest(err.body_text())
        }
    }
}
