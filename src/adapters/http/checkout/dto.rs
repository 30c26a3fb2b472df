//! HTTP DTOs (Data Transfer Objects) for checkout endpoints.
//!
//! These types define the JSON request/response structure for the checkout
//! API. They serve as the boundary between HTTP and the application layer.

use crate::domain::checkout::{AppliedCoupon, ConsentStatus, FlowState, FlowStep, OrderReference, VerificationOutcome};
use crate::domain::plan::{BillingCycle, Bundle, CyclePricing};
use crate::ports::AuthenticatedIdentity;
use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to start a checkout for a chosen bundle and billing cycle.
#[derive(Debug, Clone, Deserialize)]
pub struct StartCheckoutRequest {
    /// The bundle (product grouping) to purchase.
    pub bundle_id: String,
    /// The billing cycle to subscribe on.
    pub cycle: BillingCycle,
}

/// How the user proves their identity at the auth gate.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AuthRequest {
    /// Returning user with email and password.
    Login { email: String, password: String },
    /// New user registering mid-checkout.
    Register {
        email: String,
        name: String,
        #[serde(default)]
        phone: Option<String>,
        password: String,
    },
    /// Already signed in; identity comes from the bearer token.
    Resume {},
}

/// Request to create the e-mandate consent document.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateConsentRequest {
    /// URL the signing page returns to when done.
    pub return_url: String,
}

/// Request to create the gateway order/subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    /// URL the gateway redirects back to after checkout.
    pub return_url: String,
}

/// Request to apply a coupon code.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplyCouponRequest {
    pub code: String,
}

/// Query string of the gateway webhook notify URL.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookQuery {
    /// Checkout the event belongs to, when the notify URL carried it.
    #[serde(default)]
    pub checkout_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Snapshot of a checkout flow for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct FlowResponse {
    pub checkout_id: String,
    /// Current step, tagged with step-specific data.
    pub step: FlowStep,
    pub bundle_id: String,
    pub bundle_name: String,
    pub cycle: BillingCycle,
    /// Undiscounted cycle price in minor units.
    pub price_minor: u64,
    /// Amount payable after any applied coupon, in minor units.
    pub payable_minor: u64,
    /// Whether this cycle requires a signed e-mandate.
    pub requires_mandate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<AppliedCouponResponse>,
    /// Message shown while a step's request is in flight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing: Option<String>,
}

impl From<FlowState> for FlowResponse {
    fn from(flow: FlowState) -> Self {
        Self {
            checkout_id: flow.id.to_string(),
            payable_minor: flow.payable_minor(),
            bundle_id: flow.selection.bundle_id.as_str().to_string(),
            bundle_name: flow.selection.bundle_name.clone(),
            cycle: flow.selection.cycle,
            price_minor: flow.selection.price_minor,
            requires_mandate: flow.selection.is_autopay_flow,
            coupon: flow.coupon.as_ref().map(AppliedCouponResponse::from),
            processing: flow.processing.clone(),
            step: flow.step,
        }
    }
}

/// Coupon applied to the checkout, with its precomputed amounts.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedCouponResponse {
    pub code: String,
    pub discount_minor: u64,
    pub final_amount_minor: u64,
}

impl From<&AppliedCoupon> for AppliedCouponResponse {
    fn from(coupon: &AppliedCoupon) -> Self {
        Self {
            code: coupon.code.clone(),
            discount_minor: coupon.discount_minor,
            final_amount_minor: coupon.final_amount_minor,
        }
    }
}

/// Fresh session issued by the identity provider on login/register.
#[derive(Debug, Clone, Serialize)]
pub struct IdentityResponse {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

impl From<AuthenticatedIdentity> for IdentityResponse {
    fn from(identity: AuthenticatedIdentity) -> Self {
        Self {
            user_id: identity.user_id.as_str().to_string(),
            email: identity.email,
            access_token: identity.access_token,
            expires_in: identity.expires_in,
        }
    }
}

/// Response for the auth gate.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub flow: FlowResponse,
    /// Present for login/register; absent when resuming a session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityResponse>,
}

/// Response for consent creation.
#[derive(Debug, Clone, Serialize)]
pub struct ConsentResponse {
    pub document_id: String,
    /// Where the user signs the e-mandate document.
    pub signing_url: String,
    pub status: ConsentStatus,
    pub flow: FlowResponse,
}

/// Response for consent confirmation.
#[derive(Debug, Clone, Serialize)]
pub struct ConsentConfirmationResponse {
    pub consent_status: ConsentStatus,
    pub flow: FlowResponse,
}

/// Response for order creation: the hosted checkout session.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSessionResponse {
    pub session_id: String,
    pub reference: OrderReference,
    /// URL for the user to complete checkout on the gateway's domain.
    pub checkout_url: String,
    pub flow: FlowResponse,
}

/// The redirect bundle the client needs to leave for the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchResponse {
    pub session_id: String,
    pub reference: OrderReference,
    pub checkout_url: String,
    pub resume_url: String,
}

/// Response for the gateway return redirect.
#[derive(Debug, Clone, Serialize)]
pub struct ReturnResponse {
    pub reference: OrderReference,
    pub flow: FlowResponse,
}

/// Response for activation verification.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationResponse {
    pub checkout_id: String,
    pub reference: OrderReference,
    /// The settled (or still pending) outcome, tagged by `status`.
    #[serde(flatten)]
    pub outcome: VerificationOutcome,
}

/// Response for a successful coupon application.
#[derive(Debug, Clone, Serialize)]
pub struct CouponAppliedResponse {
    pub code: String,
    pub discount_minor: u64,
    pub final_amount_minor: u64,
    pub flow: FlowResponse,
}

/// A purchasable bundle with its per-cycle pricing.
#[derive(Debug, Clone, Serialize)]
pub struct BundleResponse {
    pub id: String,
    pub name: String,
    pub pricing: CyclePricing,
}

impl From<Bundle> for BundleResponse {
    fn from(bundle: Bundle) -> Self {
        Self {
            id: bundle.id.as_str().to_string(),
            name: bundle.name,
            pricing: bundle.pricing,
        }
    }
}

/// Response listing the purchasable bundles.
#[derive(Debug, Clone, Serialize)]
pub struct BundlesResponse {
    pub bundles: Vec<BundleResponse>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Response DTO
// ════════════════════════════════════════════════════════════════════════════════

/// Standard error response for API errors.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Create an error response with details.
    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}
