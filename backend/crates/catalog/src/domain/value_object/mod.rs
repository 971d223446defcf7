//! Value Object Module

pub mod price;
pub mod service_name;
