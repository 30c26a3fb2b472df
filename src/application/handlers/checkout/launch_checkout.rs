//! LaunchCheckoutHandler - serves the persisted hosted-checkout handoff.

use std::sync::Arc;

use crate::domain::checkout::{FlowStep, OrderReference};
use crate::domain::foundation::{CheckoutId, DomainError, ErrorCode, GatewaySessionId};
use crate::ports::FlowStateStore;

use super::store_error;

/// Command to (re)launch the hosted checkout for a flow.
#[derive(Debug, Clone)]
pub struct LaunchCheckoutCommand {
    pub checkout_id: CheckoutId,
}

/// The redirect bundle the client needs to leave for the gateway.
#[derive(Debug, Clone)]
pub struct LaunchCheckoutResult {
    pub session_id: GatewaySessionId,
    pub reference: OrderReference,
    /// Where to send the user.
    pub checkout_url: String,
    /// Where the gateway sends them back.
    pub resume_url: String,
}

/// Reads the handoff persisted at order creation and refreshes the flow's
/// TTL so it outlives the round trip to the gateway's domain.
///
/// Launching never creates gateway records, so a page refresh relaunches
/// the same session instead of opening a duplicate order.
pub struct LaunchCheckoutHandler {
    flow_store: Arc<dyn FlowStateStore>,
}

impl LaunchCheckoutHandler {
    pub fn new(flow_store: Arc<dyn FlowStateStore>) -> Self {
        Self { flow_store }
    }

    pub async fn handle(
        &self,
        cmd: LaunchCheckoutCommand,
    ) -> Result<LaunchCheckoutResult, DomainError> {
        let flow = self
            .flow_store
            .load(cmd.checkout_id)
            .await
            .map_err(store_error)?;

        let FlowStep::GatewayRedirect {
            session_id,
            reference,
            checkout_url,
            resume_url,
        } = &flow.step
        else {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("No checkout handoff at step {:?}", flow.step.kind()),
            ));
        };

        let result = LaunchCheckoutResult {
            session_id: session_id.clone(),
            reference: reference.clone(),
            checkout_url: checkout_url.clone(),
            resume_url: resume_url.clone(),
        };

        // Re-save to reset the TTL window before the user leaves.
        self.flow_store.save(&flow).await.map_err(store_error)?;

        Ok(result)
    }
}
