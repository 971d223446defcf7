//! Application Layer
//!
//! Use cases and application services.

pub mod association;
pub mod config;
pub mod order_book;
pub mod service_catalog;

// Re-exports
pub use association::AssociationManager;
pub use config::CatalogConfig;
pub use order_book::{OrderBookUseCase, PlaceOrderInput};
pub use service_catalog::{REFERENCED_SERVICE_MESSAGE, ServiceCatalogUseCase, ServiceInput};
