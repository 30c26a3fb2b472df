//! Redis-backed flow store for production deployments.
//!
//! Flow state is serialized to JSON and stored under a namespaced key
//! with SET EX so Redis enforces the TTL server-side. The load path also
//! checks the embedded creation time, so a TTL shortened by config takes
//! effect for already-stored flows.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::checkout::FlowState;
use crate::domain::foundation::CheckoutId;
use crate::ports::{FlowStateStore, FlowStoreError};

/// Redis-backed checkout flow store.
#[derive(Clone)]
pub struct RedisFlowStore {
    conn: MultiplexedConnection,
    ttl_secs: u64,
}

impl RedisFlowStore {
    pub fn new(conn: MultiplexedConnection, ttl_secs: u64) -> Self {
        Self { conn, ttl_secs }
    }

    fn key(id: CheckoutId) -> String {
        format!("checkout:flow:{}", id)
    }
}

#[async_trait]
impl FlowStateStore for RedisFlowStore {
    async fn save(&self, flow: &FlowState) -> Result<(), FlowStoreError> {
        let json = serde_json::to_string(flow)
            .map_err(|e| FlowStoreError::SerializationFailed(e.to_string()))?;

        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::key(flow.id), json, self.ttl_secs)
            .await
            .map_err(|e: redis::RedisError| FlowStoreError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn load(&self, id: CheckoutId) -> Result<FlowState, FlowStoreError> {
        let mut conn = self.conn.clone();

        let json: Option<String> = conn
            .get(Self::key(id))
            .await
            .map_err(|e: redis::RedisError| FlowStoreError::Backend(e.to_string()))?;

        let json = json.ok_or(FlowStoreError::NotFound(id))?;

        let flow: FlowState = serde_json::from_str(&json)
            .map_err(|e| FlowStoreError::DeserializationFailed(e.to_string()))?;

        if flow.is_expired(self.ttl_secs) {
            conn.del::<_, ()>(Self::key(id))
                .await
                .map_err(|e: redis::RedisError| FlowStoreError::Backend(e.to_string()))?;
            return Err(FlowStoreError::NotFound(id));
        }

        Ok(flow)
    }

    async fn delete(&self, id: CheckoutId) -> Result<(), FlowStoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(Self::key(id))
            .await
            .map_err(|e: redis::RedisError| FlowStoreError::Backend(e.to_string()))?;
        Ok(())
    }
}

impl std::fmt::Debug for RedisFlowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisFlowStore")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    // Redis integration tests require a running Redis instance and are
    // typically run separately from unit tests.
    //
    // Example test setup:
    //
    // #[tokio::test]
    // #[ignore] // Run with: cargo test -- --ignored
    // async fn test_redis_flow_store() {
    //     let client = redis::Client::open("redis://127.0.0.1/").unwrap();
    //     let conn = client.get_multiplexed_tokio_connection().await.unwrap();
    //     let store = RedisFlowStore::new(conn, 2700);
    //     // ... test code
    // }
}
