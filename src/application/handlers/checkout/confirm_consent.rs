//! ConfirmConsentHandler - resolves the consent step after signing.

use std::sync::Arc;

use crate::domain::checkout::{ConsentStatus, FlowState, FlowStep};
use crate::domain::foundation::{CheckoutId, DomainError, ErrorCode};
use crate::ports::{EsignProvider, FlowStateStore};

use super::store_error;

/// Command to confirm the flow's consent document is signed.
#[derive(Debug, Clone)]
pub struct ConfirmConsentCommand {
    pub checkout_id: CheckoutId,
}

/// Result of consent confirmation.
#[derive(Debug, Clone)]
pub struct ConfirmConsentResult {
    pub flow: FlowState,
    /// The status the provider reported, for display.
    pub consent_status: ConsentStatus,
}

/// Checks the document's signing status and advances the flow to the
/// order step.
///
/// Providers can lag behind a completed signature, so an inconclusive
/// answer (still pending, or the provider being unreachable) is treated
/// optimistically: the flow advances and the provider's webhook remains
/// the source of truth. Only a definitive `Expired` or `Failed` stops
/// the flow.
pub struct ConfirmConsentHandler {
    flow_store: Arc<dyn FlowStateStore>,
    esign_provider: Arc<dyn EsignProvider>,
}

impl ConfirmConsentHandler {
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
        cmd: ConfirmConsentCommand,
    ) -> Result<ConfirmConsentResult, DomainError> {
        let mut flow = self
            .flow_store
            .load(cmd.checkout_id)
            .await
            .map_err(store_error)?;

        let document_id = match &flow.step {
            FlowStep::Consent {
                document_id: Some(id),
            } => id.clone(),
            FlowStep::Consent { document_id: None } => {
                return Err(DomainError::new(
                    ErrorCode::InvalidStateTransition,
                    "No consent document was created for this checkout",
                ));
            }
            other => {
                return Err(DomainError::new(
                    ErrorCode::InvalidStateTransition,
                    format!("Cannot confirm consent at step {:?}", other.kind()),
                ));
            }
        };

        let status = match self.esign_provider.check_status(&document_id).await {
            Ok(status) => status,
            Err(e) if e.is_retryable() => {
                tracing::warn!(
                    error = %e,
                    document_id = %document_id,
                    "Consent status check inconclusive; proceeding optimistically"
                );
                ConsentStatus::PendingSignature
            }
            Err(e) => {
                flow.fail(e.to_string(), true);
                self.flow_store.save(&flow).await.map_err(store_error)?;
                return Err(e.into());
            }
        };

        match status {
            ConsentStatus::Completed
            | ConsentStatus::Created
            | ConsentStatus::PendingSignature => {
                flow.advance(FlowStep::Order {
                    document_id: Some(document_id),
                })?;
                self.flow_store.save(&flow).await.map_err(store_error)?;
                Ok(ConfirmConsentResult {
                    flow,
                    consent_status: status,
                })
            }
            ConsentStatus::Expired => {
                flow.fail("Consent document expired; please sign again", true);
                self.flow_store.save(&flow).await.map_err(store_error)?;
                Err(DomainError::new(
                    ErrorCode::ConsentExpired,
                    "The e-mandate signing window lapsed",
                ))
            }
            ConsentStatus::Failed => {
                flow.fail("Consent signing failed; please try again", true);
                self.flow_store.save(&flow).await.map_err(store_error)?;
                Err(DomainError::new(
                    ErrorCode::EsignError,
                    "The e-mandate could not be signed",
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::esign::MockEsignProvider;
    use crate::adapters::storage::InMemoryFlowStore;
    use crate::domain::checkout::StepKind;
    use crate::domain::foundation::{BundleId, DocumentId, UserId};
    use crate::domain::plan::{BillingCycle, Bundle, CyclePricing, PlanSelection};

    fn flow_at_consent() -> FlowState {
        let bundle = Bundle::new(
            BundleId::new("premium").unwrap(),
            "Premium",
            CyclePricing {
                yearly: Some(999_000),
                ..Default::default()
            },
        );
        let mut flow = FlowState::new(PlanSelection::select(&bundle, BillingCycle::Yearly));
        flow.user_id = Some(UserId::new("u1").unwrap());
        flow.advance(FlowStep::Auth).unwrap();
        flow.advance(FlowStep::Consent {
            document_id: Some(DocumentId::new("doc123").unwrap()),
        })
        .unwrap();
        flow
    }

    #[tokio::test]
    async fn signed_document_advances_to_order() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let flow = flow_at_consent();
        store.save(&flow).await.unwrap();

        let provider =
            MockEsignProvider::new().with_status_script(vec![ConsentStatus::Completed]);
        let handler = ConfirmConsentHandler::new(store.clone(), Arc::new(provider));

        let result = handler
            .handle(ConfirmConsentCommand { checkout_id: flow.id })
            .await
            .unwrap();

        assert_eq!(result.consent_status, ConsentStatus::Completed);
        assert_eq!(result.flow.step.kind(), StepKind::Order);

        match store.load(flow.id).await.unwrap().step {
            FlowStep::Order { document_id } => {
                assert_eq!(document_id.unwrap().as_str(), "doc123")
            }
            other => panic!("expected Order step, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn pending_status_advances_optimistically() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let flow = flow_at_consent();
        store.save(&flow).await.unwrap();

        let provider =
            MockEsignProvider::new().with_status_script(vec![ConsentStatus::PendingSignature]);
        let handler = ConfirmConsentHandler::new(store, Arc::new(provider));

        let result = handler
            .handle(ConfirmConsentCommand { checkout_id: flow.id })
            .await
            .unwrap();

        assert_eq!(result.consent_status, ConsentStatus::PendingSignature);
        assert_eq!(result.flow.step.kind(), StepKind::Order);
    }

    #[tokio::test]
    async fn expired_document_fails_recoverably() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let flow = flow_at_consent();
        store.save(&flow).await.unwrap();

        let provider = MockEsignProvider::new().with_status_script(vec![ConsentStatus::Expired]);
        let handler = ConfirmConsentHandler::new(store.clone(), Arc::new(provider));

        let err = handler
            .handle(ConfirmConsentCommand { checkout_id: flow.id })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConsentExpired);

        match store.load(flow.id).await.unwrap().step {
            FlowStep::Failed { recoverable, .. } => assert!(recoverable),
            other => panic!("expected Failed step, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn confirm_without_consent_step_is_rejected() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let bundle = Bundle::new(
            BundleId::new("premium").unwrap(),
            "Premium",
            CyclePricing {
                monthly: Some(99_900),
                ..Default::default()
            },
        );
        let flow = FlowState::new(PlanSelection::select(&bundle, BillingCycle::Monthly));
        store.save(&flow).await.unwrap();

        let handler = ConfirmConsentHandler::new(store, Arc::new(MockEsignProvider::new()));
        let err = handler
            .handle(ConfirmConsentCommand { checkout_id: flow.id })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }
}
