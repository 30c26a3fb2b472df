//! Flow store port - persistence for in-progress checkout sessions.
//!
//! The flow must survive a full-page redirect to the gateway's domain and
//! back, so it is written through this port before any handoff. Entries
//! carry a TTL; an expired entry is treated as absent.

use async_trait::async_trait;

use crate::domain::checkout::FlowState;
use crate::domain::foundation::CheckoutId;

/// Errors from flow store operations.
#[derive(Debug, thiserror::Error)]
pub enum FlowStoreError {
    #[error("Flow not found: {0}")]
    NotFound(CheckoutId),

    #[error("Failed to serialize flow state: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize flow state: {0}")]
    DeserializationFailed(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl FlowStoreError {
    /// True when the error means the entry is simply absent (including
    /// expired), as opposed to the backend being broken.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FlowStoreError::NotFound(_))
    }
}

/// Port for persisting and loading checkout flow state.
///
/// `load` applies the TTL: an entry past its window is deleted and
/// reported as `NotFound`. Implementations must tolerate concurrent
/// saves for the same id (last write wins).
#[async_trait]
pub trait FlowStateStore: Send + Sync {
    /// Persist the flow, resetting its TTL window.
    async fn save(&self, flow: &FlowState) -> Result<(), FlowStoreError>;

    /// Load a live flow. Expired entries are deleted and reported as
    /// `NotFound`.
    async fn load(&self, id: CheckoutId) -> Result<FlowState, FlowStoreError>;

    /// Remove the flow, if present. Deleting an absent flow is not an
    /// error.
    async fn delete(&self, id: CheckoutId) -> Result<(), FlowStoreError>;
}
