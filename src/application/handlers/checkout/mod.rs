//! Checkout flow handlers - one command handler per flow step.
//!
//! Ordering across handlers is enforced by `FlowState::advance`; handlers
//! only decide what the next step's data is and which port calls to make.

mod apply_coupon;
mod cancel_checkout;
mod confirm_consent;
mod create_consent;
mod create_order;
mod ensure_authenticated;
mod handle_gateway_return;
mod handle_gateway_webhook;
mod launch_checkout;
mod select_plan;
mod verify_activation;

pub use apply_coupon::{ApplyCouponCommand, ApplyCouponHandler, ApplyCouponResult};
pub use cancel_checkout::{CancelCheckoutCommand, CancelCheckoutHandler, CancelCheckoutResult};
pub use confirm_consent::{ConfirmConsentCommand, ConfirmConsentHandler, ConfirmConsentResult};
pub use create_consent::{CreateConsentCommand, CreateConsentHandler, CreateConsentResult};
pub use create_order::{CreateOrderCommand, CreateOrderHandler, CreateOrderResult};
pub use ensure_authenticated::{
    AuthAction, EnsureAuthenticatedCommand, EnsureAuthenticatedHandler, EnsureAuthenticatedResult,
};
pub use handle_gateway_return::{
    HandleGatewayReturnCommand, HandleGatewayReturnHandler, HandleGatewayReturnResult,
};
pub use handle_gateway_webhook::{
    HandleGatewayWebhookCommand, HandleGatewayWebhookHandler, HandleGatewayWebhookResult,
};
pub use launch_checkout::{LaunchCheckoutCommand, LaunchCheckoutHandler, LaunchCheckoutResult};
pub use select_plan::{SelectPlanCommand, SelectPlanHandler, SelectPlanResult};
pub use verify_activation::{
    VerifyActivationCommand, VerifyActivationHandler, VerifyActivationResult,
};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::FlowStoreError;

/// Maps a flow store error to the user-facing domain error. An absent or
/// expired flow tells the user to restart; anything else is the backend.
pub(crate) fn store_error(err: FlowStoreError) -> DomainError {
    match err {
        FlowStoreError::NotFound(id) => DomainError::new(
            ErrorCode::FlowNotFound,
            format!("No active checkout found for {}; please start again", id),
        ),
        other => DomainError::new(ErrorCode::StorageError, other.to_string()),
    }
}
