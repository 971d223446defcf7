//! Catalog Error Types
//!
//! Catalog-specific error variants on top of `kernel::error::AppError`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use rust_decimal::Decimal;
use thiserror::Error;

/// Catalog-specific result type alias
pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Order not found")]
    OrderNotFound,

    #[error("Service not found")]
    ServiceNotFound,

    /// The owner named by an order operation does not exist
    #[error("Identity not found")]
    IdentityNotFound,

    /// A business rule refused the operation
    #[error("{0}")]
    InvariantViolation(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Above what the price column can hold
    #[error("Price must not exceed {max}")]
    PriceTooHigh { max: Decimal },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::OrderNotFound
            | CatalogError::ServiceNotFound
            | CatalogError::IdentityNotFound => ErrorKind::NotFound,
            CatalogError::InvariantViolation(_)
            | CatalogError::Validation(_)
            | CatalogError::PriceTooHigh { .. } => ErrorKind::BadRequest,
            CatalogError::Database(_) | CatalogError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError; store and internal details never reach the client
    pub fn to_app_error(&self) -> AppError {
        match self {
            CatalogError::Database(_) | CatalogError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    fn log(&self) {
        match self {
            CatalogError::Database(e) => {
                tracing::error!(error = %e, "Catalog database error");
            }
            CatalogError::Internal(msg) => {
                tracing::error!(message = %msg, "Catalog internal error");
            }
            CatalogError::InvariantViolation(msg) => {
                tracing::warn!(rule = %msg, "Operation refused");
            }
            _ => {
                tracing::debug!(error = %self, "Catalog error");
            }
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for CatalogError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => CatalogError::Validation(err.message().to_string()),
            _ => CatalogError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = vec![
            (CatalogError::OrderNotFound, StatusCode::NOT_FOUND),
            (CatalogError::ServiceNotFound, StatusCode::NOT_FOUND),
            (CatalogError::IdentityNotFound, StatusCode::NOT_FOUND),
            (
                CatalogError::InvariantViolation("rule".into()),
                StatusCode::BAD_REQUEST,
            ),
            (CatalogError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                CatalogError::PriceTooHigh { max: Decimal::ONE },
                StatusCode::BAD_REQUEST,
            ),
            (
                CatalogError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code(), expected, "{error:?}");
        }
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let app = CatalogError::Internal("pool exhausted".into()).to_app_error();
        assert_eq!(app.message(), "Internal server error");
    }

    #[test]
    fn test_rule_message_is_detail() {
        let app = CatalogError::InvariantViolation("service is still referenced by orders".into())
            .to_app_error();
        assert_eq!(app.message(), "service is still referenced by orders");
    }
}
