//! Shared Kernel - Domain-crossing minimal core
//!
//! Vocabulary shared by the `auth` and `catalog` crates:
//! - Common error kinds and the unified [`error::app_error::AppError`]
//! - Numeric typed identifiers for every persisted entity
//!
//! Only things whose meaning is identical in every domain belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
