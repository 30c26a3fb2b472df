//! Application layer - command handlers orchestrating the checkout flow.
//!
//! Each handler owns one step of the flow, loads the durable flow state,
//! performs the step's external calls through ports, and persists the
//! advanced (or failed) state before returning.

pub mod handlers;

pub use handlers::checkout::{
    ApplyCouponCommand, ApplyCouponHandler, ApplyCouponResult,
    AuthAction, EnsureAuthenticatedCommand, EnsureAuthenticatedHandler,
    EnsureAuthenticatedResult,
    CancelCheckoutCommand, CancelCheckoutHandler, CancelCheckoutResult,
    ConfirmConsentCommand, ConfirmConsentHandler, ConfirmConsentResult,
    CreateConsentCommand, CreateConsentHandler, CreateConsentResult,
    CreateOrderCommand, CreateOrderHandler, CreateOrderResult,
    HandleGatewayReturnCommand, HandleGatewayReturnHandler, HandleGatewayReturnResult,
    HandleGatewayWebhookCommand, HandleGatewayWebhookHandler, HandleGatewayWebhookResult,
    LaunchCheckoutCommand, LaunchCheckoutHandler, LaunchCheckoutResult,
    SelectPlanCommand, SelectPlanHandler, SelectPlanResult,
    VerifyActivationCommand, VerifyActivationHandler, VerifyActivationResult,
};
