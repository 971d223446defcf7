//! Delete Identity Use Case
//!
//! At least one ADMIN must exist at all times. The check and the delete
//! happen inside one store operation (`delete_guarded`), so two concurrent
//! deletes of the last two admins cannot both succeed.

use std::sync::Arc;

use kernel::id::IdentityId;

use crate::domain::repository::{DeleteOutcome, IdentityRepository};
use crate::error::{AuthError, AuthResult};

pub const LAST_ADMIN_MESSAGE: &str = "cannot delete the last system admin";
pub const OWNS_ORDERS_MESSAGE: &str = "identity still owns orders";

pub struct DeleteIdentityUseCase<I>
where
    I: IdentityRepository,
{
    identity_repo: Arc<I>,
}

impl<I> DeleteIdentityUseCase<I>
where
    I: IdentityRepository,
{
    pub fn new(identity_repo: Arc<I>) -> Self {
        Self { identity_repo }
    }

    /// Delete an identity unless it is the last ADMIN or still owns orders
    ///
    /// ## Returns
    /// `Ok(true)` when deleted, `Ok(false)` when there was nothing to
    /// delete, `InvariantViolation` when a rule refused it
    pub async fn execute(&self, id: IdentityId) -> AuthResult<bool> {
        match self.identity_repo.delete_guarded(id).await? {
            DeleteOutcome::Deleted(identity) => {
                tracing::warn!(
                    identity_id = %identity.id,
                    name = %identity.display_name,
                    "Identity deleted"
                );
                Ok(true)
            }
            DeleteOutcome::NotFound => Ok(false),
            DeleteOutcome::LastAdmin => {
                Err(AuthError::InvariantViolation(LAST_ADMIN_MESSAGE.to_string()))
            }
            DeleteOutcome::StillReferenced => {
                Err(AuthError::InvariantViolation(OWNS_ORDERS_MESSAGE.to_string()))
            }
        }
    }
}
