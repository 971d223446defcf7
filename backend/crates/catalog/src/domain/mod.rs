//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    order::{NewOrder, Order},
    service::{NewServiceOffering, ServiceOffering},
};
pub use repository::{OrderMutation, OrderRepository, ServiceDeletion, ServiceRepository};
pub use value_object::{price::Price, service_name::ServiceName};
