//! Static plan catalog.
//!
//! The catalog changes through deployment, not at runtime, so it is held
//! as a fixed table built during wiring.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::foundation::BundleId;
use crate::domain::plan::Bundle;
use crate::ports::{BundleCatalog, CatalogError};

/// Catalog backed by a fixed bundle table.
#[derive(Debug, Clone, Default)]
pub struct StaticBundleCatalog {
    bundles: HashMap<BundleId, Bundle>,
}

impl StaticBundleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundle(mut self, bundle: Bundle) -> Self {
        self.bundles.insert(bundle.id.clone(), bundle);
        self
    }
}

#[async_trait]
impl BundleCatalog for StaticBundleCatalog {
    async fn get_bundle(&self, id: &BundleId) -> Result<Bundle, CatalogError> {
        self.bundles
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    async fn list_bundles(&self) -> Result<Vec<Bundle>, CatalogError> {
        let mut bundles: Vec<Bundle> = self.bundles.values().cloned().collect();
        bundles.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(bundles)
    }
}
