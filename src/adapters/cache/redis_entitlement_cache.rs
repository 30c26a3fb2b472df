//! Redis-backed entitlement cache shared across instances.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::UserId;
use crate::ports::{CachedEntitlement, EntitlementCache, EntitlementCacheError};

/// Entitlement cache stored in Redis with SET EX.
#[derive(Clone)]
pub struct RedisEntitlementCache {
    conn: MultiplexedConnection,
    ttl_secs: u64,
}

impl RedisEntitlementCache {
    pub fn new(conn: MultiplexedConnection, ttl_secs: u64) -> Self {
        Self { conn, ttl_secs }
    }

    fn key(user_id: &UserId) -> String {
        format!("entitlement:{}", user_id)
    }
}

#[async_trait]
impl EntitlementCache for RedisEntitlementCache {
    async fn get(
        &self,
        user_id: &UserId,
    ) -> Result<Option<CachedEntitlement>, EntitlementCacheError> {
        let mut conn = self.conn.clone();

        let json: Option<String> = conn
            .get(Self::key(user_id))
            .await
            .map_err(|e: redis::RedisError| EntitlementCacheError::Backend(e.to_string()))?;

        match json {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| EntitlementCacheError::Decode(e.to_string())),
            None => Ok(None),
        }
    }

    async fn put(&self, entitlement: &CachedEntitlement) -> Result<(), EntitlementCacheError> {
        let json = serde_json::to_string(entitlement)
            .map_err(|e| EntitlementCacheError::Decode(e.to_string()))?;

        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::key(&entitlement.user_id), json, self.ttl_secs)
            .await
            .map_err(|e: redis::RedisError| EntitlementCacheError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn invalidate(&self, user_id: &UserId) -> Result<(), EntitlementCacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(Self::key(user_id))
            .await
            .map_err(|e: redis::RedisError| EntitlementCacheError::Backend(e.to_string()))?;
        Ok(())
    }
}

impl std::fmt::Debug for RedisEntitlementCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisEntitlementCache")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}
