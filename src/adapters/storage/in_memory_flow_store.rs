//! In-memory flow store.
//!
//! Stores checkout flow state in a process-local map. Useful for testing
//! and single-instance development; production deployments use the Redis
//! store so flows survive restarts and load-balanced instances.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::checkout::FlowState;
use crate::domain::foundation::CheckoutId;
use crate::ports::{FlowStateStore, FlowStoreError};

/// In-memory storage for checkout flows.
#[derive(Debug, Clone)]
pub struct InMemoryFlowStore {
    flows: Arc<RwLock<HashMap<CheckoutId, FlowState>>>,
    ttl_secs: u64,
}

impl InMemoryFlowStore {
    /// Create a new store with the given TTL.
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            flows: Arc::new(RwLock::new(HashMap::new())),
            ttl_secs,
        }
    }

    /// Clear all stored flows (useful for tests).
    pub async fn clear(&self) {
        self.flows.write().await.clear();
    }

    /// Number of stored flows, including not-yet-reaped expired ones.
    pub async fn len(&self) -> usize {
        self.flows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.flows.read().await.is_empty()
    }
}

impl Default for InMemoryFlowStore {
    fn default() -> Self {
        Self::new(45 * 60)
    }
}

#[async_trait]
impl FlowStateStore for InMemoryFlowStore {
    async fn save(&self, flow: &FlowState) -> Result<(), FlowStoreError> {
        let mut flows = self.flows.write().await;
        flows.insert(flow.id, flow.clone());
        Ok(())
    }

    async fn load(&self, id: CheckoutId) -> Result<FlowState, FlowStoreError> {
        // Expired entries are reaped on read.
        {
            let flows = self.flows.read().await;
            match flows.get(&id) {
                Some(flow) if !flow.is_expired(self.ttl_secs) => return Ok(flow.clone()),
                Some(_) => {}
                None => return Err(FlowStoreError::NotFound(id)),
            }
        }

        self.flows.write().await.remove(&id);
        Err(FlowStoreError::NotFound(id))
    }

    async fn delete(&self, id: CheckoutId) -> Result<(), FlowStoreError> {
        self.flows.write().await.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{BundleId, Timestamp};
    use crate::domain::plan::{BillingCycle, Bundle, CyclePricing, PlanSelection};

    fn test_flow() -> FlowState {
        let bundle = Bundle::new(
            BundleId::new("premium").unwrap(),
            "Premium",
            CyclePricing {
                monthly: Some(99_900),
                monthly_autopay: None,
                quarterly: None,
                yearly: None,
            },
        );
        FlowState::new(PlanSelection::select(&bundle, BillingCycle::Monthly))
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let store = InMemoryFlowStore::new(1800);
        let flow = test_flow();

        store.save(&flow).await.unwrap();
        let loaded = store.load(flow.id).await.unwrap();

        assert_eq!(loaded, flow);
    }

    #[tokio::test]
    async fn load_missing_flow_is_not_found() {
        let store = InMemoryFlowStore::new(1800);
        let result = store.load(CheckoutId::new()).await;
        assert!(matches!(result, Err(FlowStoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn expired_flow_is_deleted_on_load() {
        let store = InMemoryFlowStore::new(1800);
        let mut flow = test_flow();
        flow.created_at = Timestamp::now().minus_secs(3600);

        store.save(&flow).await.unwrap();
        assert_eq!(store.len().await, 1);

        let result = store.load(flow.id).await;
        assert!(matches!(result, Err(FlowStoreError::NotFound(_))));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn delete_absent_flow_is_ok() {
        let store = InMemoryFlowStore::new(1800);
        store.delete(CheckoutId::new()).await.unwrap();
    }

    #[tokio::test]
    async fn save_overwrites_existing_flow() {
        let store = InMemoryFlowStore::new(1800);
        let mut flow = test_flow();

        store.save(&flow).await.unwrap();
        flow.advance(crate::domain::checkout::FlowStep::Auth).unwrap();
        store.save(&flow).await.unwrap();

        let loaded = store.load(flow.id).await.unwrap();
        assert_eq!(
            loaded.step.kind(),
            crate::domain::checkout::StepKind::Auth
        );
        assert_eq!(store.len().await, 1);
    }
}
