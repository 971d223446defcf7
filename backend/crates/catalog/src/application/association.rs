//! Association Manager
//!
//! Maintains the order ↔ service link. Each operation is one atomic store
//! call; this layer maps the outcome to errors and writes the audit log.

use std::sync::Arc;

use kernel::id::{IdentityId, OrderId, ServiceId};

use crate::application::config::CatalogConfig;
use crate::domain::entity::{order::Order, service::ServiceOffering};
use crate::domain::repository::{OrderMutation, OrderRepository, ServiceRepository};
use crate::error::{CatalogError, CatalogResult};

pub struct AssociationManager<O, S>
where
    O: OrderRepository,
    S: ServiceRepository,
{
    order_repo: Arc<O>,
    service_repo: Arc<S>,
    config: CatalogConfig,
}

impl<O, S> AssociationManager<O, S>
where
    O: OrderRepository,
    S: ServiceRepository,
{
    pub fn new(order_repo: Arc<O>, service_repo: Arc<S>, config: CatalogConfig) -> Self {
        Self {
            order_repo,
            service_repo,
            config,
        }
    }

    /// Link a service to an order; linking twice is the same as once
    ///
    /// ## Arguments
    /// * `order_id` - Must exist (`OrderNotFound`)
    /// * `service_id` - Must exist (`ServiceNotFound`)
    ///
    /// ## Returns
    /// The order with its current links
    pub async fn attach(&self, order_id: OrderId, service_id: ServiceId) -> CatalogResult<Order> {
        let order = applied(self.order_repo.attach_service(order_id, service_id).await?)?;

        tracing::info!(
            order_id = %order_id,
            service_id = %service_id,
            "Service attached to order"
        );

        Ok(order)
    }

    /// Unlink a service; an absent link is not an error
    pub async fn detach(&self, order_id: OrderId, service_id: ServiceId) -> CatalogResult<Order> {
        let order = applied(self.order_repo.detach_service(order_id, service_id).await?)?;

        tracing::info!(
            order_id = %order_id,
            service_id = %service_id,
            "Service detached from order"
        );

        Ok(order)
    }

    /// Services linked to an order, sorted by id
    ///
    /// A missing order yields an empty list unless
    /// `CatalogConfig::strict_order_lookup` is set.
    pub async fn list_services(&self, order_id: OrderId) -> CatalogResult<Vec<ServiceOffering>> {
        let Some(order) = self.order_repo.find_order(order_id).await? else {
            if self.config.strict_order_lookup {
                return Err(CatalogError::OrderNotFound);
            }
            return Ok(Vec::new());
        };

        self.service_repo.find_services(&order.service_ids).await
    }

    /// Hand the order to another identity; links are kept
    pub async fn change_owner(
        &self,
        order_id: OrderId,
        owner_id: IdentityId,
    ) -> CatalogResult<Order> {
        let order = applied(self.order_repo.change_owner(order_id, owner_id).await?)?;

        tracing::info!(
            order_id = %order_id,
            owner_id = %owner_id,
            "Order owner changed"
        );

        Ok(order)
    }
}

pub(crate) fn applied(mutation: OrderMutation) -> CatalogResult<Order> {
    match mutation {
        OrderMutation::Applied(order) => Ok(order),
        OrderMutation::OrderMissing => Err(CatalogError::OrderNotFound),
        OrderMutation::ServiceMissing => Err(CatalogError::ServiceNotFound),
        OrderMutation::IdentityMissing => Err(CatalogError::IdentityNotFound),
    }
}
