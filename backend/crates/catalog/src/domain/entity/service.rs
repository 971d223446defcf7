//! Service Offering Entity

use kernel::id::ServiceId;

use crate::domain::value_object::{price::Price, service_name::ServiceName};

/// A purchasable service; orders reference it, never own it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOffering {
    pub id: ServiceId,
    pub name: ServiceName,
    pub price: Price,
}

/// Fields of a service that has not been stored yet, also used for updates
#[derive(Debug, Clone)]
pub struct NewServiceOffering {
    pub name: ServiceName,
    pub price: Price,
}

impl NewServiceOffering {
    pub fn into_service(self, id: ServiceId) -> ServiceOffering {
        ServiceOffering {
            id,
            name: self.name,
            price: self.price,
        }
    }
}
