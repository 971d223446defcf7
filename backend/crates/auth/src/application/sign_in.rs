//! Sign In Use Case
//!
//! Verifies credentials and issues a bearer token.

use std::sync::Arc;

use crate::application::credential::CredentialVerifier;
use crate::application::token::TokenCodec;
use crate::domain::entity::identity::Identity;
use crate::domain::repository::IdentityRepository;
use crate::error::AuthResult;

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in output
pub struct SignInOutput {
    /// Bearer token for the `Authorization` header
    pub token: String,
    pub identity: Identity,
}

/// Sign in use case
pub struct SignInUseCase<R>
where
    R: IdentityRepository,
{
    verifier: CredentialVerifier<R>,
    codec: Arc<TokenCodec>,
}

impl<R> SignInUseCase<R>
where
    R: IdentityRepository,
{
    pub fn new(verifier: CredentialVerifier<R>, codec: Arc<TokenCodec>) -> Self {
        Self { verifier, codec }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let identity = self.verifier.verify(&input.email, &input.password).await?;
        let token = self.codec.issue(&identity)?;

        Ok(SignInOutput { token, identity })
    }
}
