//! Token Codec
//!
//! Stateless bearer tokens:
//!
//! ```text
//! base64url(json(claims)) "." base64url(hmac_sha256(secret, payload_segment))
//! ```
//!
//! The MAC covers the encoded payload segment exactly as transmitted.
//! Verification checks structure, then the signature in constant time,
//! then decodes the claims, then expiry. Expiry is the only revocation.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use kernel::id::IdentityId;
use platform::crypto::{constant_time_eq, from_base64url, hmac_sha256, to_base64url};
use serde::{Deserialize, Serialize};

use crate::application::config::AuthConfig;
use crate::domain::entity::identity::Identity;
use crate::domain::value_object::role_name::RoleName;
use crate::error::{AuthError, AuthResult};

const SEPARATOR: char = '.';

/// Token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Identity id
    pub sub: IdentityId,
    /// Roles held when the token was issued
    pub roles: BTreeSet<RoleName>,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds, exclusive)
    pub exp: i64,
}

impl Claims {
    #[inline]
    pub fn has_any_role(&self, required: &BTreeSet<RoleName>) -> bool {
        !self.roles.is_disjoint(required)
    }
}

/// Issues and verifies signed tokens
#[derive(Clone)]
pub struct TokenCodec {
    secret: Vec<u8>,
    ttl_secs: i64,
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.token_secret.clone(),
            ttl_secs: config.token_ttl_secs(),
        }
    }

    pub fn issue(&self, identity: &Identity) -> AuthResult<String> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue with an explicit clock
    ///
    /// ## Arguments
    /// * `identity` - Its id and current roles become the claims
    /// * `now` - Issue time; expiry is `now` plus the configured TTL
    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> AuthResult<String> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: identity.id,
            roles: identity.roles.clone(),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };
        self.encode(&claims)
    }

    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        self.verify_at(token, Utc::now())
    }

    /// Verify with an explicit clock
    ///
    /// ## Returns
    /// The claims; `InvalidToken` when structure or signature fail,
    /// `Expired` once `now` reaches `exp`
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<Claims> {
        let (payload_segment, signature_segment) = token
            .split_once(SEPARATOR)
            .ok_or(AuthError::InvalidToken)?;

        if payload_segment.is_empty()
            || signature_segment.is_empty()
            || signature_segment.contains(SEPARATOR)
        {
            return Err(AuthError::InvalidToken);
        }

        let signature = from_base64url(signature_segment).map_err(|_| AuthError::InvalidToken)?;
        let expected = hmac_sha256(&self.secret, payload_segment.as_bytes());
        if !constant_time_eq(&signature, &expected) {
            return Err(AuthError::InvalidToken);
        }

        let payload = from_base64url(payload_segment).map_err(|_| AuthError::InvalidToken)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| AuthError::InvalidToken)?;

        if now.timestamp() >= claims.exp {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }

    fn encode(&self, claims: &Claims) -> AuthResult<String> {
        let payload =
            serde_json::to_vec(claims).map_err(|e| AuthError::Internal(e.to_string()))?;
        let payload_segment = to_base64url(&payload);
        let signature = hmac_sha256(&self.secret, payload_segment.as_bytes());

        Ok(format!(
            "{}{}{}",
            payload_segment,
            SEPARATOR,
            to_base64url(&signature)
        ))
    }
}
