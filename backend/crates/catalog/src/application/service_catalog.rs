//! Service Catalog Use Case
//!
//! Create, read, update and delete service offerings. A service still
//! linked to an order cannot be deleted.

use std::sync::Arc;

use kernel::id::ServiceId;
use rust_decimal::Decimal;

use crate::domain::entity::service::{NewServiceOffering, ServiceOffering};
use crate::domain::repository::{ServiceDeletion, ServiceRepository};
use crate::domain::value_object::{price::Price, service_name::ServiceName};
use crate::error::{CatalogError, CatalogResult};

pub const REFERENCED_SERVICE_MESSAGE: &str = "service is still referenced by orders";

/// Service create/update input
pub struct ServiceInput {
    pub name: String,
    pub price: Decimal,
}

impl ServiceInput {
    fn validate(self) -> CatalogResult<NewServiceOffering> {
        Ok(NewServiceOffering {
            name: ServiceName::new(self.name)?,
            price: Price::new(self.price)?,
        })
    }
}

pub struct ServiceCatalogUseCase<S>
where
    S: ServiceRepository,
{
    service_repo: Arc<S>,
}

impl<S> ServiceCatalogUseCase<S>
where
    S: ServiceRepository,
{
    pub fn new(service_repo: Arc<S>) -> Self {
        Self { service_repo }
    }

    pub async fn create(&self, input: ServiceInput) -> CatalogResult<ServiceOffering> {
        let new = input.validate()?;
        let service = self.service_repo.insert_service(&new).await?;

        tracing::info!(
            service_id = %service.id,
            name = %service.name,
            price = %service.price,
            "Service created"
        );

        Ok(service)
    }

    pub async fn get(&self, id: ServiceId) -> CatalogResult<ServiceOffering> {
        self.service_repo
            .find_service(id)
            .await?
            .ok_or(CatalogError::ServiceNotFound)
    }

    pub async fn list(&self) -> CatalogResult<Vec<ServiceOffering>> {
        self.service_repo.all_services().await
    }

    pub async fn update(&self, id: ServiceId, input: ServiceInput) -> CatalogResult<ServiceOffering> {
        let new = input.validate()?;
        let service = self
            .service_repo
            .update_service(id, &new)
            .await?
            .ok_or(CatalogError::ServiceNotFound)?;

        tracing::info!(service_id = %id, "Service updated");

        Ok(service)
    }

    pub async fn delete(&self, id: ServiceId) -> CatalogResult<()> {
        match self.service_repo.delete_service(id).await? {
            ServiceDeletion::Deleted(service) => {
                tracing::warn!(
                    service_id = %service.id,
                    name = %service.name,
                    "Service deleted"
                );
                Ok(())
            }
            ServiceDeletion::NotFound => Err(CatalogError::ServiceNotFound),
            ServiceDeletion::StillReferenced => Err(CatalogError::InvariantViolation(
                REFERENCED_SERVICE_MESSAGE.to_string(),
            )),
        }
    }
}
