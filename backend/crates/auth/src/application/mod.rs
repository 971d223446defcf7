//! Application Layer
//!
//! Use cases and application services.

pub mod bootstrap;
pub mod config;
pub mod credential;
pub mod delete_identity;
pub mod find_identities;
pub mod gate;
pub mod sign_in;
pub mod sign_up;
pub mod token;

// Re-exports
pub use bootstrap::{BootstrapReport, BootstrapUseCase};
pub use config::{AuthConfig, InitialAdmin};
pub use credential::{CredentialVerifier, PlainSecretMatcher, SecretMatcher};
pub use delete_identity::DeleteIdentityUseCase;
pub use find_identities::FindIdentitiesUseCase;
pub use gate::{AccessRequirement, AuthGate, RequestContext};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_up::{SignUpInput, SignUpUseCase};
pub use token::{Claims, TokenCodec};
