//! HTTP Handlers

use std::sync::Arc;

use auth::AuthGate;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use kernel::id::{OrderId, ServiceId};

use crate::application::{
    AssociationManager, CatalogConfig, OrderBookUseCase, PlaceOrderInput, ServiceCatalogUseCase,
    ServiceInput,
};
use crate::domain::repository::{OrderRepository, ServiceRepository};
use crate::error::CatalogResult;
use crate::presentation::dto::{
    ChangeOwnerRequest, CreateOrderRequest, OrderResponse, ServiceRequest, ServiceResponse,
};

/// Shared state for service and order handlers
#[derive(Clone)]
pub struct CatalogAppState<R>
where
    R: OrderRepository + ServiceRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: CatalogConfig,
    pub gate: AuthGate,
}

impl<R> CatalogAppState<R>
where
    R: OrderRepository + ServiceRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, config: CatalogConfig, gate: AuthGate) -> Self {
        Self { repo, config, gate }
    }

    fn associations(&self) -> AssociationManager<R, R> {
        AssociationManager::new(self.repo.clone(), self.repo.clone(), self.config)
    }
}

// ============================================================================
// Services
// ============================================================================

/// GET /services
pub async fn list_services<R>(
    State(state): State<CatalogAppState<R>>,
) -> CatalogResult<Json<Vec<ServiceResponse>>>
where
    R: OrderRepository + ServiceRepository + Clone + Send + Sync + 'static,
{
    let services = ServiceCatalogUseCase::new(state.repo.clone()).list().await?;
    Ok(Json(services.iter().map(ServiceResponse::from).collect()))
}

/// GET /services/{id}
pub async fn get_service<R>(
    State(state): State<CatalogAppState<R>>,
    Path(id): Path<i64>,
) -> CatalogResult<Json<ServiceResponse>>
where
    R: OrderRepository + ServiceRepository + Clone + Send + Sync + 'static,
{
    let service = ServiceCatalogUseCase::new(state.repo.clone())
        .get(ServiceId::from_i64(id))
        .await?;
    Ok(Json(ServiceResponse::from(&service)))
}

/// POST /services
pub async fn create_service<R>(
    State(state): State<CatalogAppState<R>>,
    Json(req): Json<ServiceRequest>,
) -> CatalogResult<(StatusCode, Json<ServiceResponse>)>
where
    R: OrderRepository + ServiceRepository + Clone + Send + Sync + 'static,
{
    let service = ServiceCatalogUseCase::new(state.repo.clone())
        .create(ServiceInput {
            name: req.name,
            price: req.price,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ServiceResponse::from(&service))))
}

/// PUT /services/{id}
pub async fn update_service<R>(
    State(state): State<CatalogAppState<R>>,
    Path(id): Path<i64>,
    Json(req): Json<ServiceRequest>,
) -> CatalogResult<Json<ServiceResponse>>
where
    R: OrderRepository + ServiceRepository + Clone + Send + Sync + 'static,
{
    let service = ServiceCatalogUseCase::new(state.repo.clone())
        .update(
            ServiceId::from_i64(id),
            ServiceInput {
                name: req.name,
                price: req.price,
            },
        )
        .await?;
    Ok(Json(ServiceResponse::from(&service)))
}

/// DELETE /services/{id}
pub async fn delete_service<R>(
    State(state): State<CatalogAppState<R>>,
    Path(id): Path<i64>,
) -> CatalogResult<StatusCode>
where
    R: OrderRepository + ServiceRepository + Clone + Send + Sync + 'static,
{
    ServiceCatalogUseCase::new(state.repo.clone())
        .delete(ServiceId::from_i64(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Orders
// ============================================================================

/// GET /orders
pub async fn list_orders<R>(
    State(state): State<CatalogAppState<R>>,
) -> CatalogResult<Json<Vec<OrderResponse>>>
where
    R: OrderRepository + ServiceRepository + Clone + Send + Sync + 'static,
{
    let orders = OrderBookUseCase::new(state.repo.clone()).list().await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// GET /orders/{id}
pub async fn get_order<R>(
    State(state): State<CatalogAppState<R>>,
    Path(id): Path<i64>,
) -> CatalogResult<Json<OrderResponse>>
where
    R: OrderRepository + ServiceRepository + Clone + Send + Sync + 'static,
{
    let order = OrderBookUseCase::new(state.repo.clone())
        .get(OrderId::from_i64(id))
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /orders
pub async fn place_order<R>(
    State(state): State<CatalogAppState<R>>,
    Json(req): Json<CreateOrderRequest>,
) -> CatalogResult<(StatusCode, Json<OrderResponse>)>
where
    R: OrderRepository + ServiceRepository + Clone + Send + Sync + 'static,
{
    let order = OrderBookUseCase::new(state.repo.clone())
        .place(PlaceOrderInput {
            owner_id: req.owner_id,
            service_ids: req.service_ids,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(OrderResponse::from(&order))))
}

/// DELETE /orders/{id}
pub async fn delete_order<R>(
    State(state): State<CatalogAppState<R>>,
    Path(id): Path<i64>,
) -> CatalogResult<StatusCode>
where
    R: OrderRepository + ServiceRepository + Clone + Send + Sync + 'static,
{
    OrderBookUseCase::new(state.repo.clone())
        .delete(OrderId::from_i64(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Associations
// ============================================================================

/// GET /orders/{id}/services
pub async fn order_services<R>(
    State(state): State<CatalogAppState<R>>,
    Path(id): Path<i64>,
) -> CatalogResult<Json<Vec<ServiceResponse>>>
where
    R: OrderRepository + ServiceRepository + Clone + Send + Sync + 'static,
{
    let services = state
        .associations()
        .list_services(OrderId::from_i64(id))
        .await?;
    Ok(Json(services.iter().map(ServiceResponse::from).collect()))
}

/// POST /orders/{id}/services/{service_id}
pub async fn attach_service<R>(
    State(state): State<CatalogAppState<R>>,
    Path((order_id, service_id)): Path<(i64, i64)>,
) -> CatalogResult<Json<OrderResponse>>
where
    R: OrderRepository + ServiceRepository + Clone + Send + Sync + 'static,
{
    let order = state
        .associations()
        .attach(OrderId::from_i64(order_id), ServiceId::from_i64(service_id))
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// DELETE /orders/{id}/services/{service_id}
pub async fn detach_service<R>(
    State(state): State<CatalogAppState<R>>,
    Path((order_id, service_id)): Path<(i64, i64)>,
) -> CatalogResult<Json<OrderResponse>>
where
    R: OrderRepository + ServiceRepository + Clone + Send + Sync + 'static,
{
    let order = state
        .associations()
        .detach(OrderId::from_i64(order_id), ServiceId::from_i64(service_id))
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// PUT /orders/{id}/owner
pub async fn change_owner<R>(
    State(state): State<CatalogAppState<R>>,
    Path(id): Path<i64>,
    Json(req): Json<ChangeOwnerRequest>,
) -> CatalogResult<Json<OrderResponse>>
where
    R: OrderRepository + ServiceRepository + Clone + Send + Sync + 'static,
{
    let order = state
        .associations()
        .change_owner(OrderId::from_i64(id), req.owner_id)
        .await?;
    Ok(Json(OrderResponse::from(&order)))
}
