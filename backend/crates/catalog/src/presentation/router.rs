//! Service and Order Routers

use auth::AccessRequirement;
use auth::domain::RoleName;
use auth::middleware::guard;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::domain::repository::{OrderRepository, ServiceRepository};
use crate::presentation::handlers::{self, CatalogAppState};

fn registrars() -> AccessRequirement {
    AccessRequirement::any_of([RoleName::Admin, RoleName::Registration])
}

fn sellers() -> AccessRequirement {
    AccessRequirement::any_of([RoleName::Admin, RoleName::Sales])
}

/// Routes mounted under `/services`
pub fn service_router<R>(state: CatalogAppState<R>) -> Router
where
    R: OrderRepository + ServiceRepository + Clone + Send + Sync + 'static,
{
    let gate = state.gate.clone();

    Router::new()
        .route(
            "/",
            get(handlers::list_services::<R>).merge(guard(
                post(handlers::create_service::<R>),
                &gate,
                registrars(),
            )),
        )
        .route(
            "/{id}",
            get(handlers::get_service::<R>).merge(guard(
                put(handlers::update_service::<R>).delete(handlers::delete_service::<R>),
                &gate,
                registrars(),
            )),
        )
        .with_state(state)
}

/// Routes mounted under `/orders`
pub fn order_router<R>(state: CatalogAppState<R>) -> Router
where
    R: OrderRepository + ServiceRepository + Clone + Send + Sync + 'static,
{
    let gate = state.gate.clone();
    let signed_in = || AccessRequirement::AuthenticatedOnly;

    Router::new()
        .route(
            "/",
            guard(get(handlers::list_orders::<R>), &gate, signed_in()).merge(guard(
                post(handlers::place_order::<R>),
                &gate,
                sellers(),
            )),
        )
        .route(
            "/{id}",
            guard(get(handlers::get_order::<R>), &gate, signed_in()).merge(guard(
                delete(handlers::delete_order::<R>),
                &gate,
                sellers(),
            )),
        )
        .route(
            "/{id}/services",
            guard(get(handlers::order_services::<R>), &gate, signed_in()),
        )
        .route(
            "/{id}/services/{service_id}",
            guard(
                post(handlers::attach_service::<R>).delete(handlers::detach_service::<R>),
                &gate,
                sellers(),
            ),
        )
        .route(
            "/{id}/owner",
            guard(put(handlers::change_owner::<R>), &gate, sellers()),
        )
        .with_state(state)
}
