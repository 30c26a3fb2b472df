//! CreateConsentHandler - issues the e-mandate document for autopay flows.

use std::sync::Arc;

use crate::domain::checkout::{ConsentDocument, FlowState, FlowStep, StepKind};
use crate::domain::foundation::{CheckoutId, DomainError, ErrorCode};
use crate::ports::{ConsentRequest, EsignProvider, FlowStateStore};

use super::store_error;

/// Command to create a consent document for the flow's mandate.
#[derive(Debug, Clone)]
pub struct CreateConsentCommand {
    pub checkout_id: CheckoutId,
    /// URL the signing page returns to when done.
    pub return_url: String,
}

/// Result of consent creation.
#[derive(Debug, Clone)]
pub struct CreateConsentResult {
    pub flow: FlowState,
    /// The issued document; `signing_url` is where the user signs.
    pub document: ConsentDocument,
}

/// Creates a consent document at the signing provider and advances the
/// flow into the consent step.
///
/// Only autopay cycles pass through here; `FlowState::advance` rejects
/// the consent step for one-time purchases.
pub struct CreateConsentHandler {
    flow_store: Arc<dyn FlowStateStore>,
    esign_provider: Arc<dyn EsignProvider>,
}

impl CreateConsentHandler {
    pub fn new(
        flow_store: Arc<dyn FlowStateStore>,
        esign_provider: Arc<dyn EsignProvider>,
    ) -> Self {
        Self {
            flow_store,
            esign_provider,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateConsentCommand,
    ) -> Result<CreateConsentResult, DomainError> {
        let mut flow = self
            .flow_store
            .load(cmd.checkout_id)
            .await
            .map_err(store_error)?;

        let Some(user_id) = flow.user_id.clone() else {
            return Err(DomainError::new(
                ErrorCode::AuthenticationRequired,
                "Sign in before setting up the e-mandate",
            ));
        };

        if flow.step.kind() != StepKind::Auth {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot create consent at step {:?}", flow.step.kind()),
            ));
        }

        if !flow.selection.is_autopay_flow {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("{} does not require an e-mandate", flow.selection.cycle),
            ));
        }

        // Double-submit guard persists through the provider call.
        flow.begin_processing("Preparing your e-mandate document...")?;
        self.flow_store.save(&flow).await.map_err(store_error)?;

        let request = ConsentRequest {
            user_id,
            bundle_name: flow.selection.bundle_name.clone(),
            cycle: flow.selection.cycle,
            amount_minor: flow.payable_minor(),
            return_url: cmd.return_url,
        };

        match self.esign_provider.create_consent(request).await {
            Ok(document) => {
                flow.advance(FlowStep::Consent {
                    document_id: Some(document.document_id.clone()),
                })?;
                self.flow_store.save(&flow).await.map_err(store_error)?;
                Ok(CreateConsentResult { flow, document })
            }
            Err(e) => {
                let retryable = e.is_retryable();
                flow.fail(e.to_string(), retryable);
                self.flow_store.save(&flow).await.map_err(store_error)?;
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::esign::MockEsignProvider;
    use crate::adapters::storage::InMemoryFlowStore;
    use crate::domain::foundation::{BundleId, UserId};
    use crate::domain::plan::{BillingCycle, Bundle, CyclePricing, PlanSelection};
    use crate::ports::EsignError;

    fn flow_at_auth(cycle: BillingCycle) -> FlowState {
        let bundle = Bundle::new(
            BundleId::new("premium").unwrap(),
            "Premium",
            CyclePricing {
                monthly: Some(99_900),
                monthly_autopay: Some(89_900),
                quarterly: Some(269_900),
                yearly: Some(999_000),
            },
        );
        let mut flow = FlowState::new(PlanSelection::select(&bundle, cycle));
        flow.user_id = Some(UserId::new("u1").unwrap());
        flow.advance(FlowStep::Auth).unwrap();
        flow
    }

    fn cmd(checkout_id: CheckoutId) -> CreateConsentCommand {
        CreateConsentCommand {
            checkout_id,
            return_url: "https://app.test/checkout/consent/return".to_string(),
        }
    }

    #[tokio::test]
    async fn issues_document_and_enters_consent_step() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let flow = flow_at_auth(BillingCycle::Yearly);
        store.save(&flow).await.unwrap();

        let handler = CreateConsentHandler::new(store.clone(), Arc::new(MockEsignProvider::new()));
        let result = handler.handle(cmd(flow.id)).await.unwrap();

        assert_eq!(result.flow.step.kind(), StepKind::Consent);
        assert_eq!(result.document.document_id.as_str(), "doc123");
        assert!(result.document.signing_url.contains("doc123"));

        let stored = store.load(flow.id).await.unwrap();
        assert!(matches!(
            stored.step,
            FlowStep::Consent { document_id: Some(_) }
        ));
        assert!(stored.processing.is_none());
    }

    #[tokio::test]
    async fn one_time_cycle_cannot_enter_consent() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let flow = flow_at_auth(BillingCycle::Monthly);
        store.save(&flow).await.unwrap();

        let handler = CreateConsentHandler::new(store, Arc::new(MockEsignProvider::new()));
        let err = handler.handle(cmd(flow.id)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }

    #[tokio::test]
    async fn provider_outage_fails_recoverably() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let flow = flow_at_auth(BillingCycle::MonthlyAutopay);
        store.save(&flow).await.unwrap();

        let provider = MockEsignProvider::new()
            .failing_create(EsignError::Unavailable("gateway timeout".to_string()));
        let handler = CreateConsentHandler::new(store.clone(), Arc::new(provider));

        let err = handler.handle(cmd(flow.id)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EsignError);

        let stored = store.load(flow.id).await.unwrap();
        match stored.step {
            FlowStep::Failed {
                recoverable, resume, ..
            } => {
                assert!(recoverable);
                assert!(resume.is_some());
            }
            other => panic!("expected Failed step, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unauthenticated_flow_is_rejected() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let mut flow = flow_at_auth(BillingCycle::Yearly);
        flow.user_id = None;
        store.save(&flow).await.unwrap();

        let handler = CreateConsentHandler::new(store, Arc::new(MockEsignProvider::new()));
        let err = handler.handle(cmd(flow.id)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::AuthenticationRequired);
    }
}
