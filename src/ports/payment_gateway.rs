//! Payment gateway port for hosted checkout and mandate setup.
//!
//! Defines the contract for gateway integrations (e.g., Cashfree).
//! Implementations create orders and subscriptions on the gateway, hand
//! back a hosted checkout session, and verify final status after the
//! redirect returns or a webhook arrives.
//!
//! # Design
//!
//! - **Gateway agnostic**: the core never sees gateway wire formats
//! - **Two products**: one-time orders and mandate-backed subscriptions
//! - **Idempotent**: creation accepts an idempotency key for safe retries

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::checkout::{OrderReference, OrderStatus};
use crate::domain::foundation::{
    BundleId, DocumentId, DomainError, ErrorCode, GatewaySessionId, UserId,
};
use crate::domain::plan::BillingCycle;

/// Port for payment gateway integrations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a one-time order on the gateway and open a hosted checkout
    /// session for it.
    async fn create_order(&self, request: CreateOrderRequest)
        -> Result<GatewaySession, GatewayError>;

    /// Create a mandate-backed subscription on the gateway and open a
    /// hosted authorization session for it. Requires a signed consent
    /// document.
    async fn create_mandate(
        &self,
        request: CreateMandateRequest,
    ) -> Result<GatewaySession, GatewayError>;

    /// Fetch the current status of an order or subscription.
    async fn verify(&self, reference: &OrderReference) -> Result<GatewayStatus, GatewayError>;

    /// Verify a webhook signature and parse the event.
    ///
    /// `timestamp` is the gateway-supplied signing timestamp header.
    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
        timestamp: &str,
    ) -> Result<WebhookEvent, GatewayError>;
}

/// Request to create a one-time order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: UserId,
    pub bundle_id: BundleId,
    pub cycle: BillingCycle,
    /// Amount payable after discounts, in minor units.
    pub amount_minor: u64,
    /// Applied coupon code, if any (recorded as order metadata).
    pub coupon_code: Option<String>,
    /// URL the gateway redirects back to after checkout.
    pub return_url: String,
    /// Idempotency key for safe retries.
    pub idempotency_key: Option<String>,
}

/// Request to create a mandate-backed subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMandateRequest {
    pub user_id: UserId,
    pub bundle_id: BundleId,
    pub cycle: BillingCycle,
    /// Per-period amount in minor units.
    pub amount_minor: u64,
    /// Signed consent document backing the mandate.
    pub document_id: DocumentId,
    pub coupon_code: Option<String>,
    pub return_url: String,
    pub idempotency_key: Option<String>,
}

/// A hosted checkout session opened on the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySession {
    /// Gateway's session/token identifier.
    pub session_id: GatewaySessionId,

    /// The order or subscription the session pays for.
    pub reference: OrderReference,

    /// URL for the user to complete checkout on the gateway's domain.
    pub checkout_url: String,

    /// When the session expires (Unix timestamp), if the gateway says.
    pub expires_at: Option<i64>,
}

/// Status snapshot of an order or subscription on the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayStatus {
    pub reference: OrderReference,
    pub status: OrderStatus,
    /// The gateway's raw status string, for logging and pending displays.
    pub raw_status: String,
    /// Activation artifacts, present only once active.
    #[serde(default)]
    pub invite_links: Vec<String>,
}

/// A verified webhook event from the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from the gateway.
    pub id: String,
    pub reference: OrderReference,
    pub status: OrderStatus,
    pub raw_status: String,
    /// When the event occurred (Unix timestamp).
    pub occurred_at: i64,
}

/// Errors from payment gateway operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayError {
    pub code: GatewayErrorCode,
    pub message: String,
    /// Gateway's own error code, when available.
    pub provider_code: Option<String>,
    pub retryable: bool,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(
            GatewayErrorCode::NotFound,
            format!("{} not found", resource),
        )
    }

    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidWebhook, message)
    }

    pub fn bootstrap(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::BootstrapFailed, message)
    }

    /// Map an HTTP status from the gateway API to an error code.
    ///
    /// 409 means the user already holds an active subscription for the
    /// plan; it is surfaced as its own code so the UI can say so instead
    /// of showing a generic failure.
    pub fn from_http_status(status: u16, body: impl Into<String>) -> Self {
        let code = match status {
            400 => GatewayErrorCode::BadRequest,
            401 | 403 => GatewayErrorCode::AuthenticationError,
            404 => GatewayErrorCode::NotFound,
            409 => GatewayErrorCode::AlreadySubscribed,
            422 => GatewayErrorCode::UnprocessableRequest,
            429 => GatewayErrorCode::RateLimitExceeded,
            500..=599 => GatewayErrorCode::ProviderError,
            _ => GatewayErrorCode::Unknown,
        };
        Self::new(code, body)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for DomainError {
    fn from(err: GatewayError) -> Self {
        let code = match err.code {
            GatewayErrorCode::AlreadySubscribed => ErrorCode::AlreadySubscribed,
            GatewayErrorCode::NotFound => ErrorCode::BundleNotFound,
            GatewayErrorCode::InvalidWebhook | GatewayErrorCode::BadRequest => {
                ErrorCode::ValidationFailed
            }
            GatewayErrorCode::NetworkError
            | GatewayErrorCode::RateLimitExceeded
            | GatewayErrorCode::ProviderError
            | GatewayErrorCode::BootstrapFailed => ErrorCode::ExternalServiceError,
            _ => ErrorCode::GatewayError,
        };
        DomainError::new(code, err.message)
    }
}

/// Gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Malformed request rejected by the gateway.
    BadRequest,

    /// Semantically invalid request (e.g., unsupported mandate amount).
    UnprocessableRequest,

    /// The user already holds an active subscription for this plan.
    AlreadySubscribed,

    /// Resource not found on the gateway.
    NotFound,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Invalid webhook signature or stale timestamp.
    InvalidWebhook,

    /// One-time gateway bootstrap (key exchange) failed.
    BootstrapFailed,

    /// Gateway-side API error.
    ProviderError,

    /// Unknown error.
    Unknown,
}

impl GatewayErrorCode {
    /// Whether the operation is typically safe and useful to retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayErrorCode::NetworkError
                | GatewayErrorCode::RateLimitExceeded
                | GatewayErrorCode::BootstrapFailed
                | GatewayErrorCode::ProviderError
        )
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::AuthenticationError => "authentication_error",
            GatewayErrorCode::BadRequest => "bad_request",
            GatewayErrorCode::UnprocessableRequest => "unprocessable_request",
            GatewayErrorCode::AlreadySubscribed => "already_subscribed",
            GatewayErrorCode::NotFound => "not_found",
            GatewayErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            GatewayErrorCode::InvalidWebhook => "invalid_webhook",
            GatewayErrorCode::BootstrapFailed => "bootstrap_failed",
            GatewayErrorCode::ProviderError => "provider_error",
            GatewayErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }

    #[test]
    fn http_conflict_maps_to_already_subscribed() {
        let err = GatewayError::from_http_status(409, "subscription exists");
        assert_eq!(err.code, GatewayErrorCode::AlreadySubscribed);
        assert!(!err.retryable);

        let domain: DomainError = err.into();
        assert_eq!(domain.code, ErrorCode::AlreadySubscribed);
    }

    #[test]
    fn http_status_mapping_is_distinct() {
        assert_eq!(
            GatewayError::from_http_status(400, "").code,
            GatewayErrorCode::BadRequest
        );
        assert_eq!(
            GatewayError::from_http_status(401, "").code,
            GatewayErrorCode::AuthenticationError
        );
        assert_eq!(
            GatewayError::from_http_status(404, "").code,
            GatewayErrorCode::NotFound
        );
        assert_eq!(
            GatewayError::from_http_status(422, "").code,
            GatewayErrorCode::UnprocessableRequest
        );
        assert_eq!(
            GatewayError::from_http_status(503, "").code,
            GatewayErrorCode::ProviderError
        );
    }

    #[test]
    fn transient_errors_are_retryable() {
        assert!(GatewayErrorCode::NetworkError.is_retryable());
        assert!(GatewayErrorCode::BootstrapFailed.is_retryable());
        assert!(GatewayErrorCode::ProviderError.is_retryable());

        assert!(!GatewayErrorCode::AlreadySubscribed.is_retryable());
        assert!(!GatewayErrorCode::InvalidWebhook.is_retryable());
    }

    #[test]
    fn gateway_error_display_includes_code() {
        let err = GatewayError::invalid_webhook("signature mismatch");
        assert!(err.to_string().contains("invalid_webhook"));
        assert!(err.to_string().contains("signature mismatch"));
    }
}
