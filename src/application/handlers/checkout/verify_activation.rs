//! VerifyActivationHandler - resolves the final status after checkout.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::checkout::{FlowStep, OrderReference, VerificationOutcome};
use crate::domain::foundation::{CheckoutId, DomainError, ErrorCode};
use crate::ports::{EntitlementCache, FlowStateStore, PaymentGateway};

use super::store_error;

/// Command to verify a checkout's order or subscription.
#[derive(Debug, Clone)]
pub struct VerifyActivationCommand {
    pub checkout_id: CheckoutId,
}

/// Result of a verification attempt.
#[derive(Debug, Clone)]
pub struct VerifyActivationResult {
    pub checkout_id: CheckoutId,
    pub reference: OrderReference,
    pub outcome: VerificationOutcome,
}

/// Asks the gateway for the final status and settles the flow.
///
/// On activation the flow state is cleared and the user's entitlement
/// snapshot is invalidated, so gated pages see the new subscription
/// immediately. A pending status keeps the flow alive for a recheck; a
/// terminal failure marks the flow failed but retryable.
pub struct VerifyActivationHandler {
    flow_store: Arc<dyn FlowStateStore>,
    gateway: Arc<dyn PaymentGateway>,
    entitlement_cache: Arc<dyn EntitlementCache>,
}

impl VerifyActivationHandler {
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
        cmd: VerifyActivationCommand,
    ) -> Result<VerifyActivationResult, DomainError> {
        let mut flow = self
            .flow_store
            .load(cmd.checkout_id)
            .await
            .map_err(store_error)?;

        let reference = match &flow.step {
            FlowStep::Verifying { reference } => reference.clone(),
            // The return landed without passing through the return
            // handler (e.g. the user navigated straight to status).
            FlowStep::GatewayRedirect { reference, .. } => {
                let reference = reference.clone();
                flow.advance(FlowStep::Verifying {
                    reference: reference.clone(),
                })?;
                self.flow_store.save(&flow).await.map_err(store_error)?;
                reference
            }
            other => {
                return Err(DomainError::new(
                    ErrorCode::InvalidStateTransition,
                    format!("Nothing to verify at step {:?}", other.kind()),
                ));
            }
        };

        // A verification failure leaves the flow untouched: the status is
        // unknown, not failed, and the caller polls again.
        let status = self.gateway.verify(&reference).await?;
        let outcome =
            VerificationOutcome::from_gateway(status.status, &status.raw_status, status.invite_links);

        match &outcome {
            VerificationOutcome::Active { .. } => {
                if let Some(user_id) = &flow.user_id {
                    if let Err(e) = self.entitlement_cache.invalidate(user_id).await {
                        tracing::warn!(
                            error = %e,
                            user_id = %user_id,
                            "Entitlement cache invalidation failed after activation"
                        );
                    }
                }
                self.flow_store
                    .delete(flow.id)
                    .await
                    .map_err(store_error)?;
                tracing::info!(checkout_id = %flow.id, reference = %reference.id_str(), "Checkout activated");
            }
            VerificationOutcome::Pending { gateway_status } => {
                tracing::debug!(
                    checkout_id = %flow.id,
                    gateway_status = %gateway_status,
                    "Activation still pending"
                );
                self.flow_store.save(&flow).await.map_err(store_error)?;
            }
            VerificationOutcome::Failed { message } => {
                flow.fail(message.clone(), true);
                self.flow_store.save(&flow).await.map_err(store_error)?;
            }
            VerificationOutcome::Cancelled => {
                flow.fail("Checkout was cancelled at the gateway", true);
                self.flow_store.save(&flow).await.map_err(store_error)?;
            }
        }

        Ok(VerifyActivationResult {
            checkout_id: cmd.checkout_id,
            reference,
            outcome,
        })
    }

    /// Polls `handle` until the outcome settles or `max_attempts` runs
    /// out, sleeping `backoff` between attempts. Exhaustion returns the
    /// last pending outcome; the flow stays alive for a manual recheck.
    pub async fn poll_until_settled(
        &self,
        cmd: VerifyActivationCommand,
        max_attempts: u32,
        backoff: Duration,
    ) -> Result<VerifyActivationResult, DomainError> {
        let mut attempt = 1;
        loop {
            let result = self.handle(cmd.clone()).await?;
            let pending = matches!(result.outcome, VerificationOutcome::Pending { .. });
            if !pending || attempt >= max_attempts {
                return Ok(result);
            }
            attempt += 1;
            tokio::time::sleep(backoff).await;
        }
    }
}
