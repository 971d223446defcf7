//! Application Configuration

/// Catalog application configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogConfig {
    /// `list_services` on a missing order fails with `OrderNotFound`
    /// instead of returning an empty list
    pub strict_order_lookup: bool,
}

impl CatalogConfig {
    pub fn strict() -> Self {
        Self {
            strict_order_lookup: true,
        }
    }
}
