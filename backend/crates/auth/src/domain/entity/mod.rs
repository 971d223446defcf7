//! Entity Module

pub mod identity;
pub mod role;
