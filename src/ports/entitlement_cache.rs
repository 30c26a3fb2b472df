//! Entitlement cache port - short-lived cache of a user's subscription
//! entitlements.
//!
//! Entitlement checks back every gated page, so results are cached with
//! a short TTL. The cache is invalidated the moment a checkout activates
//! so fresh entitlements show up immediately.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BundleId, UserId};

/// A cached entitlement snapshot for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedEntitlement {
    pub user_id: UserId,
    /// Bundles the user holds an active subscription to.
    pub active_bundles: Vec<BundleId>,
    /// Unix timestamp the snapshot was taken.
    pub fetched_at: i64,
}

impl CachedEntitlement {
    pub fn has_bundle(&self, bundle_id: &BundleId) -> bool {
        self.active_bundles.contains(bundle_id)
    }
}

/// Errors from the entitlement cache.
///
/// Cache failures are never fatal to a checkout; callers log and fall
/// back to the source of truth.
#[derive(Debug, thiserror::Error)]
pub enum EntitlementCacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Failed to decode cached entry: {0}")]
    Decode(String),
}

/// Port for the entitlement cache.
#[async_trait]
pub trait EntitlementCache: Send + Sync {
    /// Read a live snapshot, if one is cached and unexpired.
    async fn get(&self, user_id: &UserId)
        -> Result<Option<CachedEntitlement>, EntitlementCacheError>;

    /// Store a snapshot, resetting its TTL.
    async fn put(&self, entitlement: &CachedEntitlement) -> Result<(), EntitlementCacheError>;

    /// Drop the snapshot for a user. Called on activation so the next
    /// check sees the new subscription.
    async fn invalidate(&self, user_id: &UserId) -> Result<(), EntitlementCacheError>;
}
