//! Order Entity

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use kernel::id::{IdentityId, OrderId, ServiceId};

/// An order: one owner plus a set of linked services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub owner_id: IdentityId,
    pub created_at: DateTime<Utc>,
    /// Linked services; a service appears at most once
    pub service_ids: BTreeSet<ServiceId>,
}

impl Order {
    #[inline]
    pub fn has_service(&self, service_id: ServiceId) -> bool {
        self.service_ids.contains(&service_id)
    }
}

/// An order that has not been stored yet
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub owner_id: IdentityId,
    pub service_ids: BTreeSet<ServiceId>,
}

impl NewOrder {
    pub fn new(owner_id: IdentityId, service_ids: impl IntoIterator<Item = ServiceId>) -> Self {
        Self {
            owner_id,
            service_ids: service_ids.into_iter().collect(),
        }
    }

    pub fn into_order(self, id: OrderId, created_at: DateTime<Utc>) -> Order {
        Order {
            id,
            owner_id: self.owner_id,
            created_at,
            service_ids: self.service_ids,
        }
    }
}
