//! In-Process Repository Implementation
//!
//! Pairs with `auth::MemoryAuthStore`: owner checks run under the auth lock
//! and the order book is registered as the store's identity references.
//! Locks are always taken auth first, catalog second.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use auth::{IdentityReferences, MemoryAuthStore};
use chrono::Utc;
use kernel::id::{IdentityId, OrderId, ServiceId};
use parking_lot::Mutex;

use crate::domain::entity::{
    order::{NewOrder, Order},
    service::{NewServiceOffering, ServiceOffering},
};
use crate::domain::repository::{
    OrderMutation, OrderRepository, ServiceDeletion, ServiceRepository,
};
use crate::error::CatalogResult;

#[derive(Default)]
struct CatalogState {
    last_service_id: i64,
    last_order_id: i64,
    services: BTreeMap<ServiceId, ServiceOffering>,
    orders: BTreeMap<OrderId, Order>,
}

impl CatalogState {
    fn all_services_exist(&self, ids: &BTreeSet<ServiceId>) -> bool {
        ids.iter().all(|id| self.services.contains_key(id))
    }
}

/// Answers "does any order name this identity as owner"
struct OwnerIndex {
    state: Arc<Mutex<CatalogState>>,
}

impl IdentityReferences for OwnerIndex {
    fn is_referenced(&self, id: IdentityId) -> bool {
        self.state
            .lock()
            .orders
            .values()
            .any(|order| order.owner_id == id)
    }
}

/// In-memory service and order store
#[derive(Clone)]
pub struct MemoryCatalogStore {
    auth: MemoryAuthStore,
    state: Arc<Mutex<CatalogState>>,
}

impl MemoryCatalogStore {
    /// Bind to the identity store whose identities own the orders
    pub fn new(auth: MemoryAuthStore) -> Self {
        let state = Arc::new(Mutex::new(CatalogState::default()));
        auth.set_identity_references(Arc::new(OwnerIndex {
            state: state.clone(),
        }));
        Self { auth, state }
    }
}

// ============================================================================
// Service Repository Implementation
// ============================================================================

impl ServiceRepository for MemoryCatalogStore {
    async fn insert_service(&self, service: &NewServiceOffering) -> CatalogResult<ServiceOffering> {
        let mut state = self.state.lock();
        state.last_service_id += 1;
        let stored = service
            .clone()
            .into_service(ServiceId::from_i64(state.last_service_id));
        state.services.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_service(&self, id: ServiceId) -> CatalogResult<Option<ServiceOffering>> {
        Ok(self.state.lock().services.get(&id).cloned())
    }

    async fn find_services(&self, ids: &BTreeSet<ServiceId>) -> CatalogResult<Vec<ServiceOffering>> {
        let state = self.state.lock();
        Ok(ids
            .iter()
            .filter_map(|id| state.services.get(id).cloned())
            .collect())
    }

    async fn all_services(&self) -> CatalogResult<Vec<ServiceOffering>> {
        Ok(self.state.lock().services.values().cloned().collect())
    }

    async fn update_service(
        &self,
        id: ServiceId,
        service: &NewServiceOffering,
    ) -> CatalogResult<Option<ServiceOffering>> {
        let mut state = self.state.lock();
        Ok(state.services.get_mut(&id).map(|stored| {
            stored.name = service.name.clone();
            stored.price = service.price;
            stored.clone()
        }))
    }

    async fn delete_service(&self, id: ServiceId) -> CatalogResult<ServiceDeletion> {
        let mut state = self.state.lock();

        if !state.services.contains_key(&id) {
            return Ok(ServiceDeletion::NotFound);
        }
        if state.orders.values().any(|order| order.has_service(id)) {
            return Ok(ServiceDeletion::StillReferenced);
        }

        match state.services.remove(&id) {
            Some(service) => Ok(ServiceDeletion::Deleted(service)),
            None => Ok(ServiceDeletion::NotFound),
        }
    }
}

// ============================================================================
// Order Repository Implementation
// ============================================================================

impl OrderRepository for MemoryCatalogStore {
    async fn insert_order(&self, order: &NewOrder) -> CatalogResult<OrderMutation> {
        Ok(self.auth.with_identity(order.owner_id, |owner_exists| {
            if !owner_exists {
                return OrderMutation::IdentityMissing;
            }

            let mut state = self.state.lock();
            if !state.all_services_exist(&order.service_ids) {
                return OrderMutation::ServiceMissing;
            }

            state.last_order_id += 1;
            let stored = order
                .clone()
                .into_order(OrderId::from_i64(state.last_order_id), Utc::now());
            state.orders.insert(stored.id, stored.clone());
            OrderMutation::Applied(stored)
        }))
    }

    async fn find_order(&self, id: OrderId) -> CatalogResult<Option<Order>> {
        Ok(self.state.lock().orders.get(&id).cloned())
    }

    async fn all_orders(&self) -> CatalogResult<Vec<Order>> {
        Ok(self.state.lock().orders.values().cloned().collect())
    }

    async fn delete_order(&self, id: OrderId) -> CatalogResult<bool> {
        Ok(self.state.lock().orders.remove(&id).is_some())
    }

    async fn attach_service(
        &self,
        order_id: OrderId,
        service_id: ServiceId,
    ) -> CatalogResult<OrderMutation> {
        let mut state = self.state.lock();

        if !state.orders.contains_key(&order_id) {
            return Ok(OrderMutation::OrderMissing);
        }
        if !state.services.contains_key(&service_id) {
            return Ok(OrderMutation::ServiceMissing);
        }

        Ok(match state.orders.get_mut(&order_id) {
            Some(order) => {
                order.service_ids.insert(service_id);
                OrderMutation::Applied(order.clone())
            }
            None => OrderMutation::OrderMissing,
        })
    }

    async fn detach_service(
        &self,
        order_id: OrderId,
        service_id: ServiceId,
    ) -> CatalogResult<OrderMutation> {
        let mut state = self.state.lock();

        Ok(match state.orders.get_mut(&order_id) {
            Some(order) => {
                order.service_ids.remove(&service_id);
                OrderMutation::Applied(order.clone())
            }
            None => OrderMutation::OrderMissing,
        })
    }

    async fn change_owner(
        &self,
        order_id: OrderId,
        owner_id: IdentityId,
    ) -> CatalogResult<OrderMutation> {
        Ok(self.auth.with_identity(owner_id, |owner_exists| {
            let mut state = self.state.lock();

            let Some(order) = state.orders.get_mut(&order_id) else {
                return OrderMutation::OrderMissing;
            };
            if !owner_exists {
                return OrderMutation::IdentityMissing;
            }

            order.owner_id = owner_id;
            OrderMutation::Applied(order.clone())
        }))
    }
}
