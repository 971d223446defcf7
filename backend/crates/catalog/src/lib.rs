//! Catalog Backend Module
//!
//! Service offerings, orders and the order ↔ service association.
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and the association manager
//! - `infra/` - PostgreSQL and in-process stores
//! - `presentation/` - HTTP handlers, DTOs, routers
//!
//! Reads of services are public; writes need ADMIN or REGISTRATION.
//! Orders need a signed-in caller to read and ADMIN or SALES to change.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::{AssociationManager, CatalogConfig};
pub use error::{CatalogError, CatalogResult};
pub use infra::memory::MemoryCatalogStore;
pub use infra::postgres::PgCatalogRepository;
pub use presentation::{CatalogAppState, order_router, service_router};
