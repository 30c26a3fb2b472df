//! CancelCheckoutHandler - abandons the current attempt.

use std::sync::Arc;

use crate::domain::checkout::FlowState;
use crate::domain::foundation::{CheckoutId, DomainError};
use crate::ports::FlowStateStore;

use super::store_error;

/// Command to cancel the current checkout attempt.
#[derive(Debug, Clone)]
pub struct CancelCheckoutCommand {
    pub checkout_id: CheckoutId,
}

/// Result of cancellation: the flow reset to plan selection.
#[derive(Debug, Clone)]
pub struct CancelCheckoutResult {
    pub flow: FlowState,
}

/// Returns the flow to plan selection and drops any applied coupon.
///
/// Cancelling only abandons the client-side wait. An order already
/// created on the gateway may still settle; a later webhook reconciles
/// it.
pub struct CancelCheckoutHandler {
    flow_store: Arc<dyn FlowStateStore>,
}

impl CancelCheckoutHandler {
    pub fn new(flow_store: Arc<dyn FlowStateStore>) -> Self {
        Self { flow_store }
    }

    pub async fn handle(
        &self,
        cmd: CancelCheckoutCommand,
    ) -> Result<CancelCheckoutResult, DomainError> {
        let mut flow = self
            .flow_store
            .load(cmd.checkout_id)
            .await
            .map_err(store_error)?;

        let from = flow.step.kind();
        flow.cancel();
        flow.coupon = None;
        self.flow_store.save(&flow).await.map_err(store_error)?;

        tracing::info!(checkout_id = %flow.id, from_step = ?from, "Checkout cancelled");

        Ok(CancelCheckoutResult { flow })
    }
}
