//! API Server Library
//!
//! Settings and router assembly, shared by the binary and the
//! end-to-end tests.

pub mod app;
pub mod config;

pub use app::{bootstrap, build_app, cors_layer};
pub use config::Settings;
