//! SelectPlanHandler - starts a checkout flow from a bundle and cycle.

use std::sync::Arc;

use crate::domain::foundation::{BundleId, CheckoutId, DomainError};
use crate::domain::checkout::FlowState;
use crate::domain::plan::{BillingCycle, PlanSelection};
use crate::ports::{BundleCatalog, FlowStateStore};

use super::store_error;

/// Command to start a checkout for a chosen plan.
#[derive(Debug, Clone)]
pub struct SelectPlanCommand {
    pub bundle_id: BundleId,
    pub cycle: BillingCycle,
}

/// Result of starting a checkout.
#[derive(Debug, Clone)]
pub struct SelectPlanResult {
    pub checkout_id: CheckoutId,
    pub flow: FlowState,
}

/// Creates a fresh flow state for the selection and persists it.
///
/// A new selection always starts a new flow; any previous checkout for
/// the user simply expires in the store.
pub struct SelectPlanHandler {
    catalog: Arc<dyn BundleCatalog>,
    flow_store: Arc<dyn FlowStateStore>,
}

impl SelectPlanHandler {
    pub fn new(catalog: Arc<dyn BundleCatalog>, flow_store: Arc<dyn FlowStateStore>) -> Self {
        Self {
            catalog,
            flow_store,
        }
    }

    pub async fn handle(&self, cmd: SelectPlanCommand) -> Result<SelectPlanResult, DomainError> {
        let bundle = self.catalog.get_bundle(&cmd.bundle_id).await?;

        let selection = PlanSelection::select(&bundle, cmd.cycle);
        if selection.price_minor == 0 {
            return Err(DomainError::validation(
                "cycle",
                format!("{} is not offered for {}", cmd.cycle, bundle.name),
            ));
        }

        let flow = FlowState::new(selection);
        self.flow_store.save(&flow).await.map_err(store_error)?;

        tracing::info!(
            checkout_id = %flow.id,
            bundle_id = %cmd.bundle_id,
            cycle = %cmd.cycle,
            "Checkout flow started"
        );

        Ok(SelectPlanResult {
            checkout_id: flow.id,
            flow,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::StaticBundleCatalog;
    use crate::adapters::storage::InMemoryFlowStore;
    use crate::domain::checkout::StepKind;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::plan::{Bundle, CyclePricing};

    fn catalog() -> StaticBundleCatalog {
        StaticBundleCatalog::new().with_bundle(Bundle::new(
            BundleId::new("premium").unwrap(),
            "Premium",
            CyclePricing {
                monthly: Some(99_900),
                monthly_autopay: None,
                quarterly: Some(269_900),
                yearly: Some(999_000),
            },
        ))
    }

    #[tokio::test]
    async fn starts_flow_at_plan_step_and_persists_it() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let handler = SelectPlanHandler::new(Arc::new(catalog()), store.clone());

        let result = handler
            .handle(SelectPlanCommand {
                bundle_id: BundleId::new("premium").unwrap(),
                cycle: BillingCycle::Yearly,
            })
            .await
            .unwrap();

        assert_eq!(result.flow.step.kind(), StepKind::Plan);
        assert_eq!(result.flow.selection.price_minor, 999_000);
        assert!(result.flow.selection.is_autopay_flow);

        let stored = store.load(result.checkout_id).await.unwrap();
        assert_eq!(stored, result.flow);
    }

    #[tokio::test]
    async fn unknown_bundle_is_rejected() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let handler = SelectPlanHandler::new(Arc::new(catalog()), store);

        let err = handler
            .handle(SelectPlanCommand {
                bundle_id: BundleId::new("nonexistent").unwrap(),
                cycle: BillingCycle::Monthly,
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::BundleNotFound);
    }

    #[tokio::test]
    async fn unpriced_cycle_is_rejected() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let handler = SelectPlanHandler::new(Arc::new(catalog()), store.clone());

        let err = handler
            .handle(SelectPlanCommand {
                bundle_id: BundleId::new("premium").unwrap(),
                cycle: BillingCycle::MonthlyAutopay,
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(store.is_empty().await);
    }
}
