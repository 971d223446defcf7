//! Sign Up Use Case
//!
//! Self-registration. New identities always start as CUSTOMER.

use std::sync::Arc;

use crate::domain::entity::identity::{Identity, NewIdentity};
use crate::domain::repository::{IdentityRepository, RoleRepository};
use crate::domain::value_object::{
    display_name::DisplayName, email::Email, role_name::RoleName, secret::Secret,
};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Sign up use case
pub struct SignUpUseCase<I, R>
where
    I: IdentityRepository,
    R: RoleRepository,
{
    identity_repo: Arc<I>,
    role_repo: Arc<R>,
}

impl<I, R> SignUpUseCase<I, R>
where
    I: IdentityRepository,
    R: RoleRepository,
{
    pub fn new(identity_repo: Arc<I>, role_repo: Arc<R>) -> Self {
        Self {
            identity_repo,
            role_repo,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<Identity> {
        let email = Email::new(input.email)?;
        let display_name = DisplayName::new(input.name)?;
        let secret = Secret::new(input.password)?;

        if self.identity_repo.exists_by_email(&email).await? {
            return Err(AuthError::Conflict);
        }

        if self
            .role_repo
            .find_by_name(RoleName::DEFAULT)
            .await?
            .is_none()
        {
            return Err(AuthError::Internal(format!(
                "role {} is not seeded",
                RoleName::DEFAULT
            )));
        }

        let identity = self
            .identity_repo
            .create(&NewIdentity::new(email, secret, display_name).with_role(RoleName::DEFAULT))
            .await?;

        tracing::info!(
            identity_id = %identity.id,
            name = %identity.display_name,
            "Identity registered"
        );

        Ok(identity)
    }
}
