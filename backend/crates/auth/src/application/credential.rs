//! Credential Verification
//!
//! Checks a submitted email/secret pair against the stored identity.

use std::sync::Arc;

use platform::crypto::constant_time_eq;

use crate::domain::entity::identity::Identity;
use crate::domain::repository::IdentityRepository;
use crate::domain::value_object::{email::Email, secret::Secret};
use crate::error::{AuthError, AuthResult};

/// Compares a stored secret with a submitted one.
///
/// Hashing schemes plug in here; the default compares the stored form
/// directly.
pub trait SecretMatcher: Send + Sync {
    fn matches(&self, stored: &Secret, supplied: &str) -> bool;
}

/// Byte-for-byte comparison in constant time
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainSecretMatcher;

impl SecretMatcher for PlainSecretMatcher {
    fn matches(&self, stored: &Secret, supplied: &str) -> bool {
        constant_time_eq(stored.expose().as_bytes(), supplied.as_bytes())
    }
}

pub struct CredentialVerifier<R>
where
    R: IdentityRepository,
{
    identity_repo: Arc<R>,
    matcher: Arc<dyn SecretMatcher>,
}

impl<R> CredentialVerifier<R>
where
    R: IdentityRepository,
{
    pub fn new(identity_repo: Arc<R>) -> Self {
        Self::with_matcher(identity_repo, Arc::new(PlainSecretMatcher))
    }

    pub fn with_matcher(identity_repo: Arc<R>, matcher: Arc<dyn SecretMatcher>) -> Self {
        Self {
            identity_repo,
            matcher,
        }
    }

    /// Check an email and secret against the stored identity
    ///
    /// ## Arguments
    /// * `email` - Matched exactly, case included
    /// * `supplied_secret` - Compared through the configured `SecretMatcher`
    ///
    /// ## Returns
    /// The identity, or `InvalidCredentials` for an unknown email and a
    /// wrong secret alike
    pub async fn verify(&self, email: &str, supplied_secret: &str) -> AuthResult<Identity> {
        let email = Email::new(email).map_err(|_| AuthError::InvalidCredentials)?;

        let Some(identity) = self.identity_repo.find_by_email(&email).await? else {
            tracing::warn!("Login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self.matcher.matches(&identity.secret, supplied_secret) {
            tracing::warn!(identity_id = %identity.id, "Login rejected: secret mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(
            identity_id = %identity.id,
            name = %identity.display_name,
            "Identity logged in"
        );

        Ok(identity)
    }
}
