//! Order Book Use Case
//!
//! Place, read and delete orders. Link changes after creation go through
//! the `AssociationManager`.

use std::sync::Arc;

use kernel::id::{IdentityId, OrderId, ServiceId};

use crate::application::association::applied;
use crate::domain::entity::order::{NewOrder, Order};
use crate::domain::repository::OrderRepository;
use crate::error::{CatalogError, CatalogResult};

/// Place order input
pub struct PlaceOrderInput {
    pub owner_id: IdentityId,
    /// Duplicates collapse
    pub service_ids: Vec<ServiceId>,
}

pub struct OrderBookUseCase<O>
where
    O: OrderRepository,
{
    order_repo: Arc<O>,
}

impl<O> OrderBookUseCase<O>
where
    O: OrderRepository,
{
    pub fn new(order_repo: Arc<O>) -> Self {
        Self { order_repo }
    }

    /// The owner and every listed service must exist
    pub async fn place(&self, input: PlaceOrderInput) -> CatalogResult<Order> {
        let new = NewOrder::new(input.owner_id, input.service_ids);
        let order = applied(self.order_repo.insert_order(&new).await?)?;

        tracing::info!(
            order_id = %order.id,
            owner_id = %order.owner_id,
            services = order.service_ids.len(),
            "Order placed"
        );

        Ok(order)
    }

    pub async fn get(&self, id: OrderId) -> CatalogResult<Order> {
        self.order_repo
            .find_order(id)
            .await?
            .ok_or(CatalogError::OrderNotFound)
    }

    pub async fn list(&self) -> CatalogResult<Vec<Order>> {
        self.order_repo.all_orders().await
    }

    /// Removes the order and its links; the services stay
    pub async fn delete(&self, id: OrderId) -> CatalogResult<()> {
        if !self.order_repo.delete_order(id).await? {
            return Err(CatalogError::OrderNotFound);
        }

        tracing::info!(order_id = %id, "Order deleted");
        Ok(())
    }
}
