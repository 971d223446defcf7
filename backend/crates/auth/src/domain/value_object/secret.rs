//! Stored Secret Value Object
//!
//! The credential an identity proves at login. How it is compared is the
//! business of a `SecretMatcher`; this type only keeps it out of logs and
//! out of any serialized view.

use kernel::error::app_error::{AppError, AppResult};
use std::fmt;

#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn new(raw: impl Into<String>) -> AppResult<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(AppError::bad_request("Password cannot be empty"));
        }
        Ok(Self(raw))
    }

    /// Create from database value
    pub fn from_db(stored: impl Into<String>) -> Self {
        Self(stored.into())
    }

    /// The stored form, for matchers and the persistence layer
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = Secret::new("hunter2").unwrap();
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("hunter2"));
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn test_secret_rejects_empty() {
        assert!(Secret::new("").is_err());
    }
}
