//! Service Name Value Object

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum service name length (in characters)
pub const SERVICE_NAME_MAX_LENGTH: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServiceName(String);

impl ServiceName {
    /// Trims surrounding whitespace, then requires 1..=120 characters
    pub fn new(name: impl Into<String>) -> AppResult<Self> {
        let name = name.into().trim().to_string();

        if name.is_empty() {
            return Err(AppError::bad_request("Service name cannot be empty"));
        }

        if name.chars().count() > SERVICE_NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Service name must be at most {} characters",
                SERVICE_NAME_MAX_LENGTH
            )));
        }

        Ok(Self(name))
    }

    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
