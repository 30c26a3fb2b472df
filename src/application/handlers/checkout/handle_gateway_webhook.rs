//! HandleGatewayWebhookHandler - applies gateway webhook events.
//!
//! The webhook is the source of truth for payment status: it can settle a
//! checkout the client never finished verifying, and it overrides a
//! client-perceived failure when the payment actually went through.

use std::sync::Arc;

use crate::domain::checkout::OrderStatus;
use crate::domain::foundation::{CheckoutId, DomainError};
use crate::ports::{EntitlementCache, FlowStateStore, PaymentGateway, WebhookEvent};

use super::store_error;

/// Command carrying the raw webhook delivery.
#[derive(Debug, Clone)]
pub struct HandleGatewayWebhookCommand {
    /// Raw request body, exactly as signed by the gateway.
    pub payload: Vec<u8>,
    /// Signature header.
    pub signature: String,
    /// Signing timestamp header.
    pub timestamp: String,
    /// Checkout the event belongs to, when the notify URL carried it.
    pub checkout_id: Option<CheckoutId>,
}

/// What the webhook did to the flow.
#[derive(Debug, Clone)]
pub enum HandleGatewayWebhookResult {
    /// Payment confirmed; the flow was cleared and entitlements
    /// invalidated.
    Activated {
        checkout_id: CheckoutId,
        event: WebhookEvent,
    },
    /// Payment failed or was cancelled; the flow was marked failed.
    MarkedFailed {
        checkout_id: CheckoutId,
        event: WebhookEvent,
    },
    /// Verified and logged, but no flow state to update.
    Acknowledged { event: WebhookEvent },
}

/// Verifies the webhook signature and reconciles the flow with the
/// gateway's view.
pub struct HandleGatewayWebhookHandler {
    flow_store: Arc<dyn FlowStateStore>,
    gateway: Arc<dyn PaymentGateway>,
    entitlement_cache: Arc<dyn EntitlementCache>,
}

impl HandleGatewayWebhookHandler {
    pub fn new(
        flow_store: Arc<dyn FlowStateStore>,
        gateway: Arc<dyn PaymentGateway>,
        entitlement_cache: Arc<dyn EntitlementCache>,
    ) -> Self {
        Self {
            flow_store,
            gateway,
            entitlement_cache,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleGatewayWebhookCommand,
    ) -> Result<HandleGatewayWebhookResult, DomainError> {
        let event = self
            .gateway
            .verify_webhook(&cmd.payload, &cmd.signature, &cmd.timestamp)
            .await?;

        tracing::info!(
            event_id = %event.id,
            reference = %event.reference.id_str(),
            status = ?event.status,
            "Gateway webhook verified"
        );

        let Some(checkout_id) = cmd.checkout_id else {
            return Ok(HandleGatewayWebhookResult::Acknowledged { event });
        };

        // The flow may already be cleared (client verified first) or
        // expired; the event is still acknowledged.
        let mut flow = match self.flow_store.load(checkout_id).await {
            Ok(flow) => flow,
            Err(e) if e.is_not_found() => {
                return Ok(HandleGatewayWebhookResult::Acknowledged { event });
            }
            Err(e) => return Err(store_error(e)),
        };

        match event.status {
            OrderStatus::Active => {
                if let Some(user_id) = &flow.user_id {
                    if let Err(e) = self.entitlement_cache.invalidate(user_id).await {
                        tracing::warn!(
                            error = %e,
                            user_id = %user_id,
                            "Entitlement cache invalidation failed on webhook activation"
                        );
                    }
                }
                self.flow_store
                    .delete(checkout_id)
                    .await
                    .map_err(store_error)?;
                Ok(HandleGatewayWebhookResult::Activated { checkout_id, event })
            }
            OrderStatus::Failed | OrderStatus::Cancelled => {
                flow.fail(format!("Payment failed ({})", event.raw_status), true);
                self.flow_store.save(&flow).await.map_err(store_error)?;
                Ok(HandleGatewayWebhookResult::MarkedFailed { checkout_id, event })
            }
            // Still in flight; just refresh the flow's TTL.
            OrderStatus::Created | OrderStatus::Pending | OrderStatus::BankApprovalPending => {
                self.flow_store.save(&flow).await.map_err(store_error)?;
                Ok(HandleGatewayWebhookResult::Acknowledged { event })
            }
        }
    }
}
