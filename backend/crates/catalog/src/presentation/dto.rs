//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::id::{IdentityId, OrderId, ServiceId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::entity::{order::Order, service::ServiceOffering};

// ============================================================================
// Services
// ============================================================================

/// Create/update service request
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceRequest {
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceResponse {
    pub id: ServiceId,
    pub name: String,
    pub price: Decimal,
}

impl From<&ServiceOffering> for ServiceResponse {
    fn from(service: &ServiceOffering) -> Self {
        Self {
            id: service.id,
            name: service.name.as_str().to_string(),
            price: service.price.amount(),
        }
    }
}

// ============================================================================
// Orders
// ============================================================================

/// Place order request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub owner_id: IdentityId,
    #[serde(default)]
    pub service_ids: Vec<ServiceId>,
}

/// Change owner request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeOwnerRequest {
    pub owner_id: IdentityId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: OrderId,
    pub owner_id: IdentityId,
    pub created_at: DateTime<Utc>,
    pub service_ids: Vec<ServiceId>,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            owner_id: order.owner_id,
            created_at: order.created_at,
            service_ids: order.service_ids.iter().copied().collect(),
        }
    }
}
