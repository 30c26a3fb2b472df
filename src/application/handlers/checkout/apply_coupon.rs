//! ApplyCouponHandler - applies a coupon code to an in-progress checkout.

use std::sync::Arc;

use crate::domain::checkout::{AppliedCoupon, FlowState, StepKind};
use crate::domain::coupon::{CouponError, Discount};
use crate::domain::foundation::{CheckoutId, DomainError, ErrorCode};
use crate::ports::{CouponRegistry, FlowStateStore};

use super::store_error;

/// Command to apply a coupon code.
#[derive(Debug, Clone)]
pub struct ApplyCouponCommand {
    pub checkout_id: CheckoutId,
    pub code: String,
}

/// Result of a successful application.
#[derive(Debug, Clone)]
pub struct ApplyCouponResult {
    pub flow: FlowState,
    pub discount: Discount,
}

/// Resolves the code against the registry and stores the computed
/// discount on the flow.
///
/// The discount is always computed against the undiscounted cycle price,
/// so applying a second code replaces the first rather than stacking.
/// Once the order exists on the gateway the amount is locked and coupons
/// are rejected.
pub struct ApplyCouponHandler {
    flow_store: Arc<dyn FlowStateStore>,
    coupon_registry: Arc<dyn CouponRegistry>,
}

impl ApplyCouponHandler {
    pub fn new(
        flow_store: Arc<dyn FlowStateStore>,
        coupon_registry: Arc<dyn CouponRegistry>,
    ) -> Self {
        Self {
            flow_store,
            coupon_registry,
        }
    }

    pub async fn handle(&self, cmd: ApplyCouponCommand) -> Result<ApplyCouponResult, DomainError> {
        let mut flow = self
            .flow_store
            .load(cmd.checkout_id)
            .await
            .map_err(store_error)?;

        if !matches!(
            flow.step.kind(),
            StepKind::Plan | StepKind::Auth | StepKind::Consent | StepKind::Order
        ) {
            return Err(DomainError::new(
                ErrorCode::ValidationFailed,
                "Too late to apply a coupon; the order amount is locked",
            ));
        }

        let coupon = self
            .coupon_registry
            .lookup(&cmd.code, &flow.selection.bundle_id)
            .await?;

        let discount = coupon
            .apply(flow.selection.price_minor)
            .map_err(|e| match e {
                CouponError::MinimumOrderValue { .. } => {
                    DomainError::new(ErrorCode::MinimumOrderValue, e.to_string())
                }
                CouponError::InvalidPercentage(_) => {
                    DomainError::new(ErrorCode::ValidationFailed, e.to_string())
                }
            })?;

        flow.coupon = Some(AppliedCoupon {
            code: coupon.code.clone(),
            discount_minor: discount.discount_minor,
            final_amount_minor: discount.final_amount_minor,
        });
        self.flow_store.save(&flow).await.map_err(store_error)?;

        tracing::info!(
            checkout_id = %flow.id,
            code = %coupon.code,
            discount_minor = discount.discount_minor,
            "Coupon applied"
        );

        Ok(ApplyCouponResult { flow, discount })
    }
}
