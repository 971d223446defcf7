//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no domain knowledge:
//! - Cryptographic utilities (HMAC-SHA256, Base64/Base64url, constant-time compare)
//! - `Authorization: Bearer` header parsing

pub mod bearer;
pub mod crypto;
