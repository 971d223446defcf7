//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong secret; the two are deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token is malformed, has a bad signature or an undecodable payload
    #[error("Invalid token")]
    InvalidToken,

    /// Token signature is fine but `exp` has passed
    #[error("Token expired")]
    Expired,

    /// No usable token on a protected route
    #[error("Authentication required")]
    Unauthorized,

    /// Valid token without any of the required roles
    #[error("Insufficient role")]
    Forbidden,

    #[error("Identity not found")]
    NotFound,

    /// A business rule refused the operation
    #[error("{0}")]
    InvariantViolation(String),

    #[error("Email already registered")]
    Conflict,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::Expired
            | AuthError::Unauthorized => ErrorKind::Unauthorized,
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::NotFound => ErrorKind::NotFound,
            AuthError::InvariantViolation(_) | AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::Conflict => ErrorKind::Conflict,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError; store and internal details never reach the client
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            AuthError::Expired => {
                AppError::unauthorized(self.to_string()).with_action("Sign in again")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Bearer challenges apply to token problems, not to a failed login
    fn challenges_bearer(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidToken | AuthError::Expired | AuthError::Unauthorized
        )
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::Forbidden => {
                tracing::warn!("Access denied: missing required role");
            }
            AuthError::InvariantViolation(msg) => {
                tracing::warn!(rule = %msg, "Operation refused");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let challenge = self.challenges_bearer();
        let mut response = self.to_app_error().into_response();
        if challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => AuthError::Validation(err.message().to_string()),
            _ => AuthError::Internal(err.to_string()),
        }
    }
}
