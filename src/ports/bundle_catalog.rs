//! Bundle catalog port - the plans available for purchase.

use async_trait::async_trait;

use crate::domain::foundation::{BundleId, DomainError, ErrorCode};
use crate::domain::plan::Bundle;

/// Errors from catalog lookup.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Bundle not found: {0}")]
    NotFound(BundleId),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

impl From<CatalogError> for DomainError {
    fn from(err: CatalogError) -> Self {
        let code = match err {
            CatalogError::NotFound(_) => ErrorCode::BundleNotFound,
            CatalogError::Unavailable(_) => ErrorCode::ExternalServiceError,
        };
        DomainError::new(code, err.to_string())
    }
}

/// Port for reading the plan catalog.
#[async_trait]
pub trait BundleCatalog: Send + Sync {
    /// Fetch a bundle with its full pricing table.
    async fn get_bundle(&self, id: &BundleId) -> Result<Bundle, CatalogError>;

    /// List all purchasable bundles.
    async fn list_bundles(&self) -> Result<Vec<Bundle>, CatalogError>;
}
