//! Repository Traits
//!
//! Implemented by `PgCatalogRepository` and `MemoryCatalogStore`. Method
//! names are prefixed per entity since one store implements both traits.

use std::collections::BTreeSet;

use kernel::id::{IdentityId, OrderId, ServiceId};

use crate::domain::entity::{
    order::{NewOrder, Order},
    service::{NewServiceOffering, ServiceOffering},
};
use crate::error::CatalogResult;

/// Result of a service delete
#[derive(Debug)]
pub enum ServiceDeletion {
    Deleted(ServiceOffering),
    NotFound,
    /// Refused: at least one order still links the service
    StillReferenced,
}

/// Result of an order write that checks referenced rows
#[derive(Debug)]
pub enum OrderMutation {
    /// Written; carries the order as it now is
    Applied(Order),
    OrderMissing,
    ServiceMissing,
    IdentityMissing,
}

/// Service offering repository trait
#[trait_variant::make(ServiceRepository: Send)]
pub trait LocalServiceRepository {
    async fn insert_service(&self, service: &NewServiceOffering) -> CatalogResult<ServiceOffering>;

    async fn find_service(&self, id: ServiceId) -> CatalogResult<Option<ServiceOffering>>;

    /// The subset of `ids` that exists, sorted by id
    async fn find_services(&self, ids: &BTreeSet<ServiceId>) -> CatalogResult<Vec<ServiceOffering>>;

    /// Every service, sorted by id
    async fn all_services(&self) -> CatalogResult<Vec<ServiceOffering>>;

    /// Replace name and price; `None` if the service is missing
    async fn update_service(
        &self,
        id: ServiceId,
        service: &NewServiceOffering,
    ) -> CatalogResult<Option<ServiceOffering>>;

    /// Delete unless an order still links the service, as one atomic step
    async fn delete_service(&self, id: ServiceId) -> CatalogResult<ServiceDeletion>;
}

/// Order repository trait
///
/// Every mutation checks the rows it references and writes in one atomic
/// step.
#[trait_variant::make(OrderRepository: Send)]
pub trait LocalOrderRepository {
    /// Owner and every service must exist
    async fn insert_order(&self, order: &NewOrder) -> CatalogResult<OrderMutation>;

    async fn find_order(&self, id: OrderId) -> CatalogResult<Option<Order>>;

    /// Every order, sorted by id
    async fn all_orders(&self) -> CatalogResult<Vec<Order>>;

    /// Removes the order and its links; `false` if it was missing
    async fn delete_order(&self, id: OrderId) -> CatalogResult<bool>;

    /// Link a service; already linked is success
    async fn attach_service(
        &self,
        order_id: OrderId,
        service_id: ServiceId,
    ) -> CatalogResult<OrderMutation>;

    /// Unlink a service; not linked is success
    async fn detach_service(
        &self,
        order_id: OrderId,
        service_id: ServiceId,
    ) -> CatalogResult<OrderMutation>;

    /// Reassign the owner, keeping the links
    async fn change_owner(
        &self,
        order_id: OrderId,
        owner_id: IdentityId,
    ) -> CatalogResult<OrderMutation>;
}
