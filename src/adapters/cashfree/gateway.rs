//! Cashfree payment gateway adapter.
//!
//! Implements the `PaymentGateway` trait against the Cashfree REST API.
//! Handles one-time orders, mandate-backed subscriptions, hosted checkout
//! sessions, status verification, and webhook verification.
//!
//! # Security
//!
//! - HMAC-SHA256 webhook signature verification with constant-time comparison
//! - Timestamp validation (5-minute window) for replay attack prevention
//! - Secrets handled via `secrecy::SecretString`
//!
//! # Bootstrap
//!
//! The gateway requires a one-time credential handshake per process
//! before the first API call. It runs lazily through a `OnceCell` so a
//! failed handshake is retried on the next request instead of poisoning
//! the process.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tokio::sync::OnceCell;

use crate::domain::checkout::OrderReference;
use crate::domain::foundation::{GatewaySessionId, OrderId, SubscriptionId};
use crate::ports::{
    CreateMandateRequest, CreateOrderRequest, GatewayError, GatewayErrorCode, GatewaySession,
    GatewayStatus, PaymentGateway, WebhookEvent,
};

use super::types::{
    hex_decode, hex_encode, map_order_status, map_subscription_status, CashfreeErrorResponse,
    CashfreeOrderResponse, CashfreeSubscriptionResponse, CashfreeWebhookEnvelope,
};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age for webhook events (5 minutes).
const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

/// Cashfree API configuration.
#[derive(Clone)]
pub struct CashfreeConfig {
    /// Merchant client ID.
    client_id: String,

    /// Merchant client secret.
    client_secret: SecretString,

    /// Webhook signing secret.
    webhook_secret: SecretString,

    /// Base URL for the Cashfree API.
    api_base_url: String,

    /// API version header value.
    api_version: String,
}

impl CashfreeConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        webhook_secret: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: "https://api.cashfree.com".to_string(),
            api_version: "2023-08-01".to_string(),
        }
    }

    /// Set a custom API base URL (sandbox or testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Cashfree payment gateway adapter.
pub struct CashfreeGateway {
    config: CashfreeConfig,
    http_client: reqwest::Client,
    bootstrapped: OnceCell<()>,
}

impl CashfreeGateway {
    pub fn new(config: CashfreeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
            bootstrapped: OnceCell::new(),
        }
    }

    /// Run the once-per-process credential handshake if it has not
    /// succeeded yet. A failed handshake is not cached: the next call
    /// retries it.
    async fn ensure_bootstrapped(&self) -> Result<(), GatewayError> {
        self.bootstrapped
            .get_or_try_init(|| async {
                let url = format!("{}/pg/merchants/authenticate", self.config.api_base_url);

                let response = self
                    .authorized(self.http_client.post(&url))
                    .send()
                    .await
                    .map_err(|e| GatewayError::bootstrap(e.to_string()))?;

                if !response.status().is_success() {
                    let body = response.text().await.unwrap_or_default();
                    tracing::error!(error = %body, "Gateway bootstrap handshake failed");
                    return Err(GatewayError::bootstrap(format!(
                        "Credential handshake rejected: {}",
                        body
                    )));
                }

                tracing::info!("Gateway bootstrap handshake completed");
                Ok(())
            })
            .await
            .copied()
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("x-client-id", &self.config.client_id)
            .header("x-client-secret", self.config.client_secret.expose_secret())
            .header("x-api-version", &self.config.api_version)
    }

    /// Turn a non-success response into a `GatewayError`, keeping the
    /// gateway's own error code when the body parses.
    async fn error_from_response(response: reqwest::Response) -> GatewayError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        let (message, provider_code) = match serde_json::from_str::<CashfreeErrorResponse>(&body) {
            Ok(parsed) => (parsed.message, parsed.code),
            Err(_) => (body, None),
        };

        let mut err = GatewayError::from_http_status(status, message);
        if let Some(code) = provider_code {
            err = err.with_provider_code(code);
        }
        err
    }

    /// Verify the webhook signature: HMAC-SHA256 over
    /// `{timestamp}.{payload}`, hex-encoded, constant-time compared.
    fn verify_signature(
        &self,
        payload: &[u8],
        signature: &str,
        timestamp: &str,
    ) -> Result<i64, GatewayError> {
        let event_time: i64 = timestamp
            .trim()
            .parse()
            .map_err(|_| GatewayError::invalid_webhook("Invalid timestamp header"))?;

        let now = chrono::Utc::now().timestamp();
        let age = now - event_time;

        if age > MAX_TIMESTAMP_AGE_SECS {
            tracing::warn!(
                event_timestamp = event_time,
                current_time = now,
                age_secs = age,
                "Webhook event too old - possible replay attack"
            );
            return Err(GatewayError::invalid_webhook(format!(
                "Event too old ({} seconds)",
                age
            )));
        }

        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                event_timestamp = event_time,
                current_time = now,
                "Webhook event from future - clock skew or manipulation"
            );
            return Err(GatewayError::invalid_webhook("Event timestamp in future"));
        }

        let provided = hex_decode(signature)
            .ok_or_else(|| GatewayError::invalid_webhook("Signature is not valid hex"))?;

        let signed_payload = format!("{}.{}", event_time, String::from_utf8_lossy(payload));

        let mut mac =
            HmacSha256::new_from_slice(self.config.webhook_secret.expose_secret().as_bytes())
                .map_err(|_| GatewayError::invalid_webhook("Webhook secret unusable"))?;
        mac.update(signed_payload.as_bytes());
        let expected = mac.finalize().into_bytes();

        let expected_bytes: &[u8] = expected.as_slice();
        if expected_bytes.ct_eq(provided.as_slice()).unwrap_u8() != 1 {
            tracing::warn!(
                expected_signature = hex_encode(expected_bytes),
                "Invalid webhook signature"
            );
            return Err(GatewayError::invalid_webhook("Invalid signature"));
        }

        Ok(event_time)
    }
}

#[async_trait]
impl PaymentGateway for CashfreeGateway {
    async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<GatewaySession, GatewayError> {
        self.ensure_bootstrapped().await?;

        let url = format!("{}/pg/orders", self.config.api_base_url);

        let mut body = json!({
            "order_amount": request.amount_minor as f64 / 100.0,
            "order_currency": "INR",
            "customer_details": {
                "customer_id": request.user_id.as_str(),
            },
            "order_meta": {
                "return_url": request.return_url,
                "bundle_id": request.bundle_id.as_str(),
                "billing_cycle": request.cycle.to_string(),
            },
        });
        if let Some(coupon) = &request.coupon_code {
            body["order_tags"] = json!({ "coupon_code": coupon });
        }

        let mut builder = self.authorized(self.http_client.post(&url)).json(&body);
        if let Some(key) = &request.idempotency_key {
            builder = builder.header("x-idempotency-key", key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if !response.status().is_success() {
            let err = Self::error_from_response(response).await;
            tracing::error!(code = %err.code, "Cashfree create_order failed");
            return Err(err);
        }

        let order: CashfreeOrderResponse = response.json().await.map_err(|e| {
            GatewayError::new(
                GatewayErrorCode::ProviderError,
                format!("Failed to parse order response: {}", e),
            )
        })?;

        let session_id = order
            .payment_session_id
            .as_deref()
            .and_then(|s| GatewaySessionId::new(s).ok())
            .ok_or_else(|| {
                GatewayError::new(
                    GatewayErrorCode::ProviderError,
                    "Order created without a payment session",
                )
            })?;

        let order_id = OrderId::new(&order.order_id).map_err(|e| {
            GatewayError::new(GatewayErrorCode::ProviderError, e.to_string())
        })?;

        Ok(GatewaySession {
            checkout_url: format!(
                "{}/pg/view/checkout/{}",
                self.config.api_base_url, session_id
            ),
            session_id,
            reference: OrderReference::Order(order_id),
            expires_at: order.order_expiry_time,
        })
    }

    async fn create_mandate(
        &self,
        request: CreateMandateRequest,
    ) -> Result<GatewaySession, GatewayError> {
        self.ensure_bootstrapped().await?;

        let url = format!("{}/pg/subscriptions", self.config.api_base_url);

        let mut body = json!({
            "plan_details": {
                "plan_name": request.bundle_id.as_str(),
                "plan_recurring_amount": request.amount_minor as f64 / 100.0,
                "plan_currency": "INR",
                "plan_interval_days": request.cycle.interval_days(),
            },
            "customer_details": {
                "customer_id": request.user_id.as_str(),
            },
            "authorization_details": {
                "consent_document_id": request.document_id.as_str(),
            },
            "subscription_meta": {
                "return_url": request.return_url,
            },
        });
        if let Some(coupon) = &request.coupon_code {
            body["subscription_tags"] = json!({ "coupon_code": coupon });
        }

        let mut builder = self.authorized(self.http_client.post(&url)).json(&body);
        if let Some(key) = &request.idempotency_key {
            builder = builder.header("x-idempotency-key", key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if !response.status().is_success() {
            let err = Self::error_from_response(response).await;
            tracing::error!(code = %err.code, "Cashfree create_mandate failed");
            return Err(err);
        }

        let sub: CashfreeSubscriptionResponse = response.json().await.map_err(|e| {
            GatewayError::new(
                GatewayErrorCode::ProviderError,
                format!("Failed to parse subscription response: {}", e),
            )
        })?;

        let session_id = sub
            .subscription_session_id
            .as_deref()
            .and_then(|s| GatewaySessionId::new(s).ok())
            .ok_or_else(|| {
                GatewayError::new(
                    GatewayErrorCode::ProviderError,
                    "Subscription created without an authorization session",
                )
            })?;

        let subscription_id = SubscriptionId::new(&sub.subscription_id).map_err(|e| {
            GatewayError::new(GatewayErrorCode::ProviderError, e.to_string())
        })?;

        Ok(GatewaySession {
            checkout_url: format!(
                "{}/pg/view/subscription/{}",
                self.config.api_base_url, session_id
            ),
            session_id,
            reference: OrderReference::Subscription(subscription_id),
            expires_at: sub.subscription_expiry_time,
        })
    }

    async fn verify(&self, reference: &OrderReference) -> Result<GatewayStatus, GatewayError> {
        self.ensure_bootstrapped().await?;

        let (url, is_subscription) = match reference {
            OrderReference::Order(id) => (
                format!("{}/pg/orders/{}", self.config.api_base_url, id),
                false,
            ),
            OrderReference::Subscription(id) => (
                format!("{}/pg/subscriptions/{}", self.config.api_base_url, id),
                true,
            ),
        };

        let response = self
            .authorized(self.http_client.get(&url))
            .send()
            .await
            .map_err(|e| GatewayError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let (status, raw_status, invite_links) = if is_subscription {
            let sub: CashfreeSubscriptionResponse = response.json().await.map_err(|e| {
                GatewayError::new(
                    GatewayErrorCode::ProviderError,
                    format!("Failed to parse subscription response: {}", e),
                )
            })?;
            (
                map_subscription_status(&sub.subscription_status),
                sub.subscription_status,
                sub.invite_links,
            )
        } else {
            let order: CashfreeOrderResponse = response.json().await.map_err(|e| {
                GatewayError::new(
                    GatewayErrorCode::ProviderError,
                    format!("Failed to parse order response: {}", e),
                )
            })?;
            (
                map_order_status(&order.order_status),
                order.order_status,
                order.invite_links,
            )
        };

        Ok(GatewayStatus {
            reference: reference.clone(),
            status,
            raw_status,
            invite_links,
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
        timestamp: &str,
    ) -> Result<WebhookEvent, GatewayError> {
        let event_time = self.verify_signature(payload, signature, timestamp)?;

        let envelope: CashfreeWebhookEnvelope = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            GatewayError::invalid_webhook(format!("Invalid JSON: {}", e))
        })?;

        let (reference, status, raw_status) = if let Some(sub) = &envelope.data.subscription {
            let id = SubscriptionId::new(&sub.subscription_id)
                .map_err(|e| GatewayError::invalid_webhook(e.to_string()))?;
            (
                OrderReference::Subscription(id),
                map_subscription_status(&sub.subscription_status),
                sub.subscription_status.clone(),
            )
        } else if let Some(order) = &envelope.data.order {
            let id = OrderId::new(&order.order_id)
                .map_err(|e| GatewayError::invalid_webhook(e.to_string()))?;
            (
                OrderReference::Order(id),
                map_order_status(&order.order_status),
                order.order_status.clone(),
            )
        } else {
            return Err(GatewayError::invalid_webhook(
                "Webhook carries neither an order nor a subscription",
            ));
        };

        Ok(WebhookEvent {
            id: envelope
                .event_id
                .unwrap_or_else(|| format!("{}:{}", envelope.event_type, reference.id_str())),
            reference,
            status,
            raw_status,
            occurred_at: envelope.event_time.unwrap_or(event_time),
        })
    }
}
