//! Value Object Module

pub mod display_name;
pub mod email;
pub mod role_name;
pub mod secret;
