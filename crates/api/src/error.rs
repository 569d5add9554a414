//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::cloudinary::CloudinaryError;
use crate::db::RepositoryError;
use crate::services::auth::{AuthError, TokenError};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Image hosting operation failed.
    #[error("Cloudinary error: {0}")]
    Cloudinary(#[from] CloudinaryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Missing or invalid bearer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the role does not allow this.
    #[error("Forbidden")]
    Forbidden,

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Shorthand for a 400 with a message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::InvalidValue(_) => StatusCode::BAD_REQUEST,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Cloudinary(err) => match err {
                CloudinaryError::NotAnImage(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::Token(_) => StatusCode::UNAUTHORIZED,
                AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
                AuthError::Repository(RepositoryError::InvalidValue(_)) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(RepositoryError::Conflict(detail)) => {
                format!("Conflict: {detail}")
            }
            Self::Database(RepositoryError::InvalidValue(detail)) => {
                format!("Invalid value: {detail}")
            }
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Cloudinary(CloudinaryError::NotAnImage(content_type)) => {
                format!("Only image uploads are accepted (got {content_type})")
            }
            Self::Cloudinary(_) => "Image upload failed".to_string(),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid username or password".to_string(),
                AuthError::Token(_) => "Invalid or expired token".to_string(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::Repository(RepositoryError::Conflict(detail)) => {
                    format!("Conflict: {detail}")
                }
                AuthError::Repository(RepositoryError::InvalidValue(detail)) => {
                    format!("Invalid value: {detail}")
                }
                _ => "Internal server error".to_string(),
            },
            Self::Unauthorized(msg) => msg.clone(),
            _ if status.is_server_error() => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        Self::Auth(AuthError::Token(err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        Self::BadRequest(err.body_text())
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Name the missing entity when a repository write finds no row.
pub trait OrNotFound<T> {
    /// Turn `RepositoryError::NotFound` into `AppError::NotFound(entity)`.
    ///
    /// # Errors
    ///
    /// Returns the repository error converted into an `AppError`.
    fn or_not_found(self, entity: &'static str) -> Result<T>;
}

impl<T> OrNotFound<T> for std::result::Result<T, RepositoryError> {
    fn or_not_found(self, entity: &'static str) -> Result<T> {
        self.map_err(|err| match err {
            RepositoryError::NotFound => AppError::NotFound(entity),
            other => AppError::Database(other),
        })
    }
}

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, username: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            username: username.map(String::from),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Product");
        assert_eq!(err.to_string(), "Product not found");

        let err = AppError::bad_request("Keyword cannot be empty");
        assert_eq!(err.to_string(), "Keyword cannot be empty");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(get_status(AppError::NotFound("User")), StatusCode::NOT_FOUND);
        assert_eq!(
            get_status(AppError::Unauthorized("missing token".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(get_status(AppError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            get_status(AppError::bad_request("test")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_error_mapping() {
        assert_eq!(
            get_status(RepositoryError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(RepositoryError::Conflict("app_user_phone_key".to_string()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(RepositoryError::DataCorruption("bad".to_string()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(
                RepositoryError::InvalidValue("value too long for column".to_string()).into()
            ),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(
                AuthError::Repository(RepositoryError::InvalidValue("x".to_string())).into()
            ),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_invalid_value_body_names_reason() {
        let response = AppError::from(RepositoryError::InvalidValue(
            "numeric value out of range (cart_item_quantity_check)".to_string(),
        ))
        .into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(
            bytes,
            "Invalid value: numeric value out of range (cart_item_quantity_check)"
        );
    }

    #[tokio::test]
    async fn test_invalid_credentials_body() {
        let response = AppError::from(AuthError::InvalidCredentials).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(bytes, "Invalid username or password");
    }

    #[test]
    fn test_auth_error_mapping() {
        assert_eq!(
            get_status(AuthError::InvalidCredentials.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AuthError::WeakPassword("short".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(TokenError::Expired.into()),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_or_not_found_names_entity() {
        let missing: std::result::Result<(), RepositoryError> = Err(RepositoryError::NotFound);
        let err = missing.or_not_found("Cart item").unwrap_err();
        assert_eq!(err.to_string(), "Cart item not found");

        let conflict: std::result::Result<(), RepositoryError> =
            Err(RepositoryError::Conflict("review_user_id_fkey".to_string()));
        assert_eq!(
            get_status(conflict.or_not_found("Review").unwrap_err()),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_cloudinary_error_mapping() {
        assert_eq!(
            get_status(CloudinaryError::NotAnImage("text/plain".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(
                CloudinaryError::Api {
                    status: 401,
                    message: "Invalid Signature".to_string()
                }
                .into()
            ),
            StatusCode::BAD_GATEWAY
        );
    }
}
