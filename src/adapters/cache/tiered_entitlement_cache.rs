//! Two-tier entitlement cache.
//!
//! A short-TTL in-memory tier sits in front of a shared backing tier
//! (Redis in production). Reads hit memory first and backfill it on a
//! backing-tier hit. Writes and invalidations go to both tiers; an
//! invalidation failure in the backing tier is surfaced because a stale
//! shared entry would outlive the local one.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::UserId;
use crate::ports::{CachedEntitlement, EntitlementCache, EntitlementCacheError};

use super::InMemoryEntitlementCache;

/// In-memory tier over a shared backing cache.
pub struct TieredEntitlementCache {
    local: InMemoryEntitlementCache,
    backing: Arc<dyn EntitlementCache>,
}

impl TieredEntitlementCache {
    pub fn new(local_ttl_secs: u64, backing: Arc<dyn EntitlementCache>) -> Self {
        Self {
            local: InMemoryEntitlementCache::new(local_ttl_secs),
            backing,
        }
    }
}

#[async_trait]
impl EntitlementCache for TieredEntitlementCache {
    async fn get(
        &self,
        user_id: &UserId,
    ) -> Result<Option<CachedEntitlement>, EntitlementCacheError> {
        if let Some(entry) = self.local.get(user_id).await? {
            return Ok(Some(entry));
        }

        match self.backing.get(user_id).await {
            Ok(Some(entry)) => {
                self.local.put(&entry).await?;
                Ok(Some(entry))
            }
            Ok(None) => Ok(None),
            // A broken backing tier degrades to local-only reads.
            Err(e) => {
                tracing::warn!(error = %e, "Backing entitlement cache read failed");
                Ok(None)
            }
        }
    }

    async fn put(&self, entitlement: &CachedEntitlement) -> Result<(), EntitlementCacheError> {
        self.local.put(entitlement).await?;
        if let Err(e) = self.backing.put(entitlement).await {
            tracing::warn!(error = %e, "Backing entitlement cache write failed");
        }
        Ok(())
    }

    async fn invalidate(&self, user_id: &UserId) -> Result<(), EntitlementCacheError> {
        self.local.invalidate(user_id).await?;
        self.backing.invalidate(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::BundleId;

    fn entitlement(user: &str) -> CachedEntitlement {
        CachedEntitlement {
            user_id: UserId::new(user).unwrap(),
            active_bundles: vec![BundleId::new("premium").unwrap()],
            fetched_at: 1_700_000_000,
        }
    }

    struct FailingCache;

    #[async_trait]
    impl EntitlementCache for FailingCache {
        async fn get(
            &self,
            _user_id: &UserId,
        ) -> Result<Option<CachedEntitlement>, EntitlementCacheError> {
            Err(EntitlementCacheError::Backend("down".to_string()))
        }

        async fn put(&self, _e: &CachedEntitlement) -> Result<(), EntitlementCacheError> {
            Err(EntitlementCacheError::Backend("down".to_string()))
        }

        async fn invalidate(&self, _user_id: &UserId) -> Result<(), EntitlementCacheError> {
            Err(EntitlementCacheError::Backend("down".to_string()))
        }
    }

    #[tokio::test]
    async fn backing_hit_backfills_local_tier() {
        let backing = Arc::new(InMemoryEntitlementCache::new(300));
        let entry = entitlement("u1");
        backing.put(&entry).await.unwrap();

        let tiered = TieredEntitlementCache::new(60, backing.clone());
        assert_eq!(tiered.get(&entry.user_id).await.unwrap(), Some(entry.clone()));

        // Remove from backing; the local tier still serves it.
        backing.invalidate(&entry.user_id).await.unwrap();
        assert_eq!(tiered.get(&entry.user_id).await.unwrap(), Some(entry));
    }

    #[tokio::test]
    async fn invalidate_clears_both_tiers() {
        let backing = Arc::new(InMemoryEntitlementCache::new(300));
        let tiered = TieredEntitlementCache::new(60, backing.clone());
        let entry = entitlement("u1");

        tiered.put(&entry).await.unwrap();
        tiered.invalidate(&entry.user_id).await.unwrap();

        assert_eq!(tiered.get(&entry.user_id).await.unwrap(), None);
        assert_eq!(backing.get(&entry.user_id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn broken_backing_tier_degrades_reads_and_writes() {
        let tiered = TieredEntitlementCache::new(60, Arc::new(FailingCache));
        let entry = entitlement("u1");

        tiered.put(&entry).await.unwrap();
        assert_eq!(tiered.get(&entry.user_id).await.unwrap(), Some(entry.clone()));

        // Invalidation must not silently succeed when the shared tier
        // cannot be cleared.
        assert!(tiered.invalidate(&entry.user_id).await.is_err());
    }
}
