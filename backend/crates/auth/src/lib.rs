//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases, token codec, access gate
//! - `infra/` - PostgreSQL and in-process stores
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Email + secret credentials, self-registration as CUSTOMER
//! - Stateless HMAC-SHA256 bearer tokens carrying identity id and roles
//! - Role-gated routes (ADMIN, REGISTRATION, SALES, CUSTOMER)
//! - At least one ADMIN is kept at all times
//!
//! ## Security Model
//! - Tokens are verified on every request; expiry is the only invalidation
//! - Signature comparison runs in constant time
//! - Secrets never leave the crate in responses or logs

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{AuthConfig, InitialAdmin};
pub use application::gate::{AccessRequirement, AuthGate, RequestContext};
pub use application::token::TokenCodec;
pub use error::{AuthError, AuthResult};
pub use infra::memory::{IdentityReferences, MemoryAuthStore};
pub use infra::postgres::PgAuthRepository;
pub use presentation::router::identity_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
