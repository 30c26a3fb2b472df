//! In-memory entitlement cache.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::{CachedEntitlement, EntitlementCache, EntitlementCacheError};

/// Process-local entitlement cache with per-entry TTL.
#[derive(Debug, Clone)]
pub struct InMemoryEntitlementCache {
    entries: Arc<RwLock<HashMap<UserId, (CachedEntitlement, Timestamp)>>>,
    ttl_secs: u64,
}

impl InMemoryEntitlementCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl_secs,
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl EntitlementCache for InMemoryEntitlementCache {
    async fn get(
        &self,
        user_id: &UserId,
    ) -> Result<Option<CachedEntitlement>, EntitlementCacheError> {
        {
            let entries = self.entries.read().await;
            match entries.get(user_id) {
                Some((entry, stored_at))
                    if stored_at.elapsed().num_seconds() < self.ttl_secs as i64 =>
                {
                    return Ok(Some(entry.clone()))
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        self.entries.write().await.remove(user_id);
        Ok(None)
    }

    async fn put(&self, entitlement: &CachedEntitlement) -> Result<(), EntitlementCacheError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            entitlement.user_id.clone(),
            (entitlement.clone(), Timestamp::now()),
        );
        Ok(())
    }

    async fn invalidate(&self, user_id: &UserId) -> Result<(), EntitlementCacheError> {
        self.entries.write().await.remove(user_id);
        Ok(())
    }
}
