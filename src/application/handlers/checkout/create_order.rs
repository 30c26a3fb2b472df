//! CreateOrderHandler - creates the gateway order/subscription and
//! persists the hosted-checkout handoff.

use std::sync::Arc;

use crate::domain::checkout::{FlowState, FlowStep, StepKind};
use crate::domain::foundation::{CheckoutId, DocumentId, DomainError, ErrorCode};
use crate::ports::{
    CreateMandateRequest, CreateOrderRequest, FlowStateStore, GatewayErrorCode, GatewaySession,
    PaymentGateway,
};

use super::store_error;

/// Command to create the order (or mandate-backed subscription) for a
/// checkout.
#[derive(Debug, Clone)]
pub struct CreateOrderCommand {
    pub checkout_id: CheckoutId,
    /// URL the gateway redirects back to after checkout.
    pub return_url: String,
}

/// Result of order creation.
#[derive(Debug, Clone)]
pub struct CreateOrderResult {
    pub flow: FlowState,
    pub session: GatewaySession,
}

/// Creates the gateway-side record and opens its hosted checkout session.
///
/// The session, hosted URL and resume URL are persisted into the flow
/// *before* the redirect URL is returned: the flow must be recoverable
/// once the user leaves for the gateway's domain. Re-running the command
/// after the handoff returns the persisted session instead of creating a
/// duplicate order.
pub struct CreateOrderHandler {
    flow_store: Arc<dyn FlowStateStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl CreateOrderHandler {
    pub fn new(flow_store: Arc<dyn FlowStateStore>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { flow_store, gateway }
    }

    pub async fn handle(&self, cmd: CreateOrderCommand) -> Result<CreateOrderResult, DomainError> {
        let mut flow = self
            .flow_store
            .load(cmd.checkout_id)
            .await
            .map_err(store_error)?;

        let Some(user_id) = flow.user_id.clone() else {
            return Err(DomainError::new(
                ErrorCode::AuthenticationRequired,
                "Sign in before creating the order",
            ));
        };

        // One-time cycles arrive here straight from the auth gate.
        if flow.step.kind() == StepKind::Auth && !flow.selection.is_autopay_flow {
            flow.advance(FlowStep::Order { document_id: None })?;
        }

        let document_id: Option<DocumentId> = match &flow.step {
            FlowStep::Order { document_id } => document_id.clone(),
            FlowStep::GatewayRedirect {
                session_id,
                reference,
                checkout_url,
                ..
            } => {
                // Already created; hand back the persisted session.
                let session = GatewaySession {
                    session_id: session_id.clone(),
                    reference: reference.clone(),
                    checkout_url: checkout_url.clone(),
                    expires_at: None,
                };
                return Ok(CreateOrderResult { flow, session });
            }
            other => {
                return Err(DomainError::new(
                    ErrorCode::InvalidStateTransition,
                    format!("Cannot create an order at step {:?}", other.kind()),
                ));
            }
        };

        let amount_minor = flow.payable_minor();
        if amount_minor == 0 {
            return Err(DomainError::validation(
                "amount",
                "Order amount must be positive",
            ));
        }

        flow.begin_processing("Creating your order...")?;
        self.flow_store.save(&flow).await.map_err(store_error)?;

        let coupon_code = flow.coupon.as_ref().map(|c| c.code.clone());
        let idempotency_key = Some(flow.id.to_string());

        let created = match document_id {
            Some(document_id) => {
                self.gateway
                    .create_mandate(CreateMandateRequest {
                        user_id,
                        bundle_id: flow.selection.bundle_id.clone(),
                        cycle: flow.selection.cycle,
                        amount_minor,
                        document_id,
                        coupon_code,
                        return_url: cmd.return_url.clone(),
                        idempotency_key,
                    })
                    .await
            }
            None => {
                self.gateway
                    .create_order(CreateOrderRequest {
                        user_id,
                        bundle_id: flow.selection.bundle_id.clone(),
                        cycle: flow.selection.cycle,
                        amount_minor,
                        coupon_code,
                        return_url: cmd.return_url.clone(),
                        idempotency_key,
                    })
                    .await
            }
        };

        match created {
            Ok(session) => {
                flow.advance(FlowStep::GatewayRedirect {
                    session_id: session.session_id.clone(),
                    reference: session.reference.clone(),
                    checkout_url: session.checkout_url.clone(),
                    resume_url: cmd.return_url,
                })?;
                self.flow_store.save(&flow).await.map_err(store_error)?;
                Ok(CreateOrderResult { flow, session })
            }
            Err(e) => {
                // 409 means an active subscription already exists; there
                // is nothing to retry.
                let recoverable = e.code != GatewayErrorCode::AlreadySubscribed && e.retryable;
                flow.fail(e.message.clone(), recoverable);
                self.flow_store.save(&flow).await.map_err(store_error)?;
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cashfree::MockGateway;
    use crate::adapters::storage::InMemoryFlowStore;
    use crate::domain::checkout::AppliedCoupon;
    use crate::domain::foundation::{BundleId, UserId};
    use crate::domain::plan::{BillingCycle, Bundle, CyclePricing, PlanSelection};
    use crate::ports::GatewayError;

    fn bundle() -> Bundle {
        Bundle::new(
            BundleId::new("premium").unwrap(),
            "Premium",
            CyclePricing {
                monthly: Some(99_900),
                monthly_autopay: Some(89_900),
                quarterly: Some(269_900),
                yearly: Some(999_000),
            },
        )
    }

    fn flow_at_auth(cycle: BillingCycle) -> FlowState {
        let mut flow = FlowState::new(PlanSelection::select(&bundle(), cycle));
        flow.user_id = Some(UserId::new("u1").unwrap());
        flow.advance(FlowStep::Auth).unwrap();
        flow
    }

    fn autopay_flow_at_order() -> FlowState {
        let mut flow = flow_at_auth(BillingCycle::Yearly);
        flow.advance(FlowStep::Consent {
            document_id: Some(crate::domain::foundation::DocumentId::new("doc123").unwrap()),
        })
        .unwrap();
        flow.advance(FlowStep::Order {
            document_id: Some(crate::domain::foundation::DocumentId::new("doc123").unwrap()),
        })
        .unwrap();
        flow
    }

    fn cmd(checkout_id: CheckoutId) -> CreateOrderCommand {
        CreateOrderCommand {
            checkout_id,
            return_url: "https://app.test/checkout/return".to_string(),
        }
    }

    #[tokio::test]
    async fn one_time_order_persists_handoff_before_returning() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let flow = flow_at_auth(BillingCycle::Monthly);
        store.save(&flow).await.unwrap();

        let handler = CreateOrderHandler::new(store.clone(), Arc::new(MockGateway::new()));
        let result = handler.handle(cmd(flow.id)).await.unwrap();

        assert_eq!(result.flow.step.kind(), StepKind::GatewayRedirect);
        assert!(!result.session.reference.is_subscription());

        let stored = store.load(flow.id).await.unwrap();
        match stored.step {
            FlowStep::GatewayRedirect {
                checkout_url,
                resume_url,
                ..
            } => {
                assert_eq!(checkout_url, result.session.checkout_url);
                assert_eq!(resume_url, "https://app.test/checkout/return");
            }
            other => panic!("expected GatewayRedirect, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn autopay_flow_creates_mandate_backed_subscription() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let flow = autopay_flow_at_order();
        store.save(&flow).await.unwrap();

        let handler = CreateOrderHandler::new(store, Arc::new(MockGateway::new()));
        let result = handler.handle(cmd(flow.id)).await.unwrap();

        assert!(result.session.reference.is_subscription());
    }

    #[tokio::test]
    async fn rerun_after_handoff_returns_persisted_session() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let flow = flow_at_auth(BillingCycle::Monthly);
        store.save(&flow).await.unwrap();

        let handler = CreateOrderHandler::new(store, Arc::new(MockGateway::new()));
        let first = handler.handle(cmd(flow.id)).await.unwrap();
        let second = handler.handle(cmd(flow.id)).await.unwrap();

        assert_eq!(
            first.session.session_id.as_str(),
            second.session.session_id.as_str()
        );
        assert_eq!(second.flow.step.kind(), StepKind::GatewayRedirect);
    }

    #[tokio::test]
    async fn applied_coupon_discounts_the_charged_amount() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let mut flow = flow_at_auth(BillingCycle::Monthly);
        flow.coupon = Some(AppliedCoupon {
            code: "SAVE20".to_string(),
            discount_minor: 19_980,
            final_amount_minor: 79_920,
        });
        store.save(&flow).await.unwrap();

        assert_eq!(flow.payable_minor(), 79_920);

        let handler = CreateOrderHandler::new(store, Arc::new(MockGateway::new()));
        assert!(handler.handle(cmd(flow.id)).await.is_ok());
    }

    #[tokio::test]
    async fn already_subscribed_conflict_is_unrecoverable() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let flow = flow_at_auth(BillingCycle::Monthly);
        store.save(&flow).await.unwrap();

        let gateway = MockGateway::new().failing_create(GatewayError::from_http_status(
            409,
            "An active subscription already exists for this plan",
        ));
        let handler = CreateOrderHandler::new(store.clone(), Arc::new(gateway));

        let err = handler.handle(cmd(flow.id)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadySubscribed);

        match store.load(flow.id).await.unwrap().step {
            FlowStep::Failed {
                recoverable, resume, ..
            } => {
                assert!(!recoverable);
                assert!(resume.is_none());
            }
            other => panic!("expected Failed step, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn transient_gateway_failure_is_retryable() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let flow = flow_at_auth(BillingCycle::Monthly);
        store.save(&flow).await.unwrap();

        let gateway = MockGateway::new()
            .failing_create(GatewayError::network("connection reset by peer"));
        let handler = CreateOrderHandler::new(store.clone(), Arc::new(gateway));

        let err = handler.handle(cmd(flow.id)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ExternalServiceError);

        let mut stored = store.load(flow.id).await.unwrap();
        assert!(stored.retry().is_ok());
        assert_eq!(stored.step.kind(), StepKind::Order);
    }

    #[tokio::test]
    async fn zero_amount_never_reaches_the_gateway() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let empty_bundle = Bundle::new(
            BundleId::new("unpriced").unwrap(),
            "Unpriced",
            CyclePricing::default(),
        );
        let mut flow = FlowState::new(PlanSelection::select(&empty_bundle, BillingCycle::Monthly));
        flow.user_id = Some(UserId::new("u1").unwrap());
        flow.advance(FlowStep::Auth).unwrap();
        store.save(&flow).await.unwrap();

        let handler = CreateOrderHandler::new(store, Arc::new(MockGateway::new()));
        let err = handler.handle(cmd(flow.id)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
