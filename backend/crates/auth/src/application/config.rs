//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::fmt;
use std::time::Duration;

use crate::error::{AuthError, AuthResult};

/// Minimum token secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Default token lifetime (1 hour)
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC-SHA256 key for signing tokens
    pub token_secret: Vec<u8>,
    /// Token lifetime from issue to expiry
    pub token_ttl: Duration,
    /// Seeded at bootstrap when no identity holds ADMIN
    pub initial_admin: Option<InitialAdmin>,
}

/// Credentials for the administrator created on first start
#[derive(Clone)]
pub struct InitialAdmin {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: vec![0u8; MIN_SECRET_LEN],
            token_ttl: DEFAULT_TOKEN_TTL,
            initial_admin: None,
        }
    }
}

impl AuthConfig {
    /// Create config with a caller-supplied secret (production)
    pub fn with_secret(secret: Vec<u8>) -> AuthResult<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::Internal(format!(
                "token secret must be at least {} bytes, got {}",
                MIN_SECRET_LEN,
                secret.len()
            )));
        }
        Ok(Self {
            token_secret: secret,
            ..Default::default()
        })
    }

    /// Create config with a random token secret
    pub fn with_random_secret() -> Self {
        Self {
            token_secret: platform::crypto::random_bytes(MIN_SECRET_LEN),
            ..Default::default()
        }
    }

    /// Create config for development; tokens die with the process
    pub fn development() -> Self {
        Self::with_random_secret()
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_initial_admin(mut self, admin: InitialAdmin) -> Self {
        self.initial_admin = Some(admin);
        self
    }

    /// Token TTL in whole seconds
    pub fn token_ttl_secs(&self) -> i64 {
        i64::try_from(self.token_ttl.as_secs()).unwrap_or(i64::MAX)
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("initial_admin", &self.initial_admin)
            .finish()
    }
}

impl fmt::Debug for InitialAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitialAdmin")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttl_is_one_hour() {
        assert_eq!(AuthConfig::default().token_ttl_secs(), 3600);
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(AuthConfig::with_secret(vec![1u8; 16]).is_err());
        assert!(AuthConfig::with_secret(vec![1u8; 32]).is_ok());
    }

    #[test]
    fn test_random_secrets_differ() {
        let a = AuthConfig::with_random_secret();
        let b = AuthConfig::with_random_secret();
        assert_eq!(a.token_secret.len(), MIN_SECRET_LEN);
        assert_ne!(a.token_secret, b.token_secret);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AuthConfig::development().with_initial_admin(InitialAdmin {
            email: "root@oficina.com".into(),
            password: "topsecret".into(),
            name: "Root".into(),
        });
        let debug = format!("{:?}", config);
        assert!(!debug.contains("topsecret"));
        assert!(debug.contains("root@oficina.com"));
    }
}
