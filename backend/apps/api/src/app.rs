//! Application Assembly
//!
//! Wires the stores into the routers. Generic over the repositories so
//! the binary and the tests build the same router.

use std::sync::Arc;

use auth::application::{BootstrapReport, BootstrapUseCase};
use auth::domain::repository::{IdentityRepository, RoleRepository};
use auth::presentation::AuthAppState;
use auth::{AuthConfig, AuthResult, identity_router};
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use catalog::domain::repository::{OrderRepository, ServiceRepository};
use catalog::{CatalogAppState, CatalogConfig, order_router, service_router};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

/// Seed roles and the configured admin; safe on every start
pub async fn bootstrap<A>(repo: Arc<A>, config: Arc<AuthConfig>) -> AuthResult<BootstrapReport>
where
    A: IdentityRepository + RoleRepository,
{
    let report = BootstrapUseCase::new(repo.clone(), repo, config)
        .execute()
        .await?;

    tracing::info!(
        roles_created = report.roles_created,
        admin_seeded = report.admin_seeded,
        "Bootstrap completed"
    );

    Ok(report)
}

/// `/users`, `/services` and `/orders` over the given stores
pub fn build_app<A, C>(
    auth_repo: Arc<A>,
    catalog_repo: Arc<C>,
    auth_config: Arc<AuthConfig>,
    catalog_config: CatalogConfig,
) -> Router
where
    A: IdentityRepository + RoleRepository + Clone + Send + Sync + 'static,
    C: OrderRepository + ServiceRepository + Clone + Send + Sync + 'static,
{
    let auth_state = AuthAppState::new(auth_repo, auth_config);
    let catalog_state = CatalogAppState::new(catalog_repo, catalog_config, auth_state.gate.clone());

    Router::new()
        .nest("/users", identity_router(auth_state))
        .nest("/services", service_router(catalog_state.clone()))
        .nest("/orders", order_router(catalog_state))
}

pub fn cors_layer(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
}
