//! HandleGatewayReturnHandler - lands the user back from the gateway.
//!
//! Gateways are inconsistent about which query parameter carries the
//! order token on the return redirect, and sometimes send none at all.
//! The persisted reference from the handoff step is authoritative; the
//! return parameters only cross-check it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::checkout::{extract_return_token, FlowState, FlowStep, OrderReference};
use crate::domain::foundation::{CheckoutId, DomainError, ErrorCode};
use crate::ports::FlowStateStore;

use super::store_error;

/// Command carrying the raw query parameters of the return redirect.
#[derive(Debug, Clone)]
pub struct HandleGatewayReturnCommand {
    pub checkout_id: CheckoutId,
    pub params: HashMap<String, String>,
}

/// Result of processing the return.
#[derive(Debug, Clone)]
pub struct HandleGatewayReturnResult {
    pub flow: FlowState,
    /// The reference to verify next.
    pub reference: OrderReference,
}

/// Moves the flow from the handoff step into verification.
pub struct HandleGatewayReturnHandler {
    flow_store: Arc<dyn FlowStateStore>,
}

impl HandleGatewayReturnHandler {
    pub fn new(flow_store: Arc<dyn FlowStateStore>) -> Self {
        Self { flow_store }
    }

    pub async fn handle(
        &self,
        cmd: HandleGatewayReturnCommand,
    ) -> Result<HandleGatewayReturnResult, DomainError> {
        let mut flow = self
            .flow_store
            .load(cmd.checkout_id)
            .await
            .map_err(store_error)?;

        let reference = match &flow.step {
            FlowStep::GatewayRedirect { reference, .. } => {
                let reference = reference.clone();
                if let Some(token) = extract_return_token(&cmd.params) {
                    if token != reference.id_str() {
                        tracing::warn!(
                            checkout_id = %flow.id,
                            returned = %token,
                            stored = %reference.id_str(),
                            "Return token does not match the stored reference; using stored"
                        );
                    }
                }
                flow.advance(FlowStep::Verifying {
                    reference: reference.clone(),
                })?;
                self.flow_store.save(&flow).await.map_err(store_error)?;
                reference
            }
            // The user reloaded the return page; nothing to advance.
            FlowStep::Verifying { reference } => reference.clone(),
            other => {
                return Err(DomainError::new(
                    ErrorCode::InvalidStateTransition,
                    format!("Unexpected gateway return at step {:?}", other.kind()),
                ));
            }
        };

        Ok(HandleGatewayReturnResult { flow, reference })
    }
}
