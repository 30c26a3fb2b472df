//! Cashfree wire types for API responses and webhook payloads.
//!
//! These types mirror the gateway's JSON as it arrives and are mapped to
//! domain types before leaving the adapter.

use serde::{Deserialize, Serialize};

use crate::domain::checkout::OrderStatus;

// ════════════════════════════════════════════════════════════════════════════════
// Status Mapping
// ════════════════════════════════════════════════════════════════════════════════

/// Map an order status string from the gateway.
///
/// An order reported as `ACTIVE` is created but unpaid; only `PAID`
/// grants access. Unknown strings map to `Pending` so a new gateway
/// status never flips a checkout to failed by surprise.
pub fn map_order_status(raw: &str) -> OrderStatus {
    match raw {
        "PAID" => OrderStatus::Active,
        "ACTIVE" => OrderStatus::Pending,
        "EXPIRED" | "TERMINATED" => OrderStatus::Cancelled,
        "FAILED" => OrderStatus::Failed,
        _ => OrderStatus::Pending,
    }
}

/// Map a subscription status string from the gateway.
///
/// `BANK_APPROVAL_PENDING` is kept distinct: the mandate is authorized
/// but the bank has not approved it yet, which can take days and is not
/// a failure.
pub fn map_subscription_status(raw: &str) -> OrderStatus {
    match raw {
        "ACTIVE" => OrderStatus::Active,
        "BANK_APPROVAL_PENDING" => OrderStatus::BankApprovalPending,
        "INITIALIZED" | "PENDING" | "AUTHORIZED" => OrderStatus::Pending,
        "CANCELLED" | "EXPIRED" => OrderStatus::Cancelled,
        "FAILED" | "ON_HOLD" => OrderStatus::Failed,
        _ => OrderStatus::Pending,
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// API Response Types
// ════════════════════════════════════════════════════════════════════════════════

/// Response from creating or fetching a one-time order.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CashfreeOrderResponse {
    /// Merchant-visible order ID.
    pub order_id: String,

    /// Gateway's internal order ID.
    pub cf_order_id: Option<String>,

    /// Hosted checkout session token.
    pub payment_session_id: Option<String>,

    /// Order status string (ACTIVE, PAID, EXPIRED, ...).
    pub order_status: String,

    /// Session expiry (Unix timestamp), if the gateway says.
    pub order_expiry_time: Option<i64>,

    /// Activation artifacts attached once the order is paid.
    #[serde(default)]
    pub invite_links: Vec<String>,
}

/// Response from creating or fetching a subscription.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CashfreeSubscriptionResponse {
    /// Merchant-visible subscription reference.
    pub subscription_id: String,

    /// Hosted mandate authorization session token.
    pub subscription_session_id: Option<String>,

    /// Subscription status string (INITIALIZED, BANK_APPROVAL_PENDING,
    /// ACTIVE, ...).
    pub subscription_status: String,

    pub subscription_expiry_time: Option<i64>,

    #[serde(default)]
    pub invite_links: Vec<String>,
}

/// Error body returned by the gateway API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CashfreeErrorResponse {
    pub message: String,
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Types
// ════════════════════════════════════════════════════════════════════════════════

/// Webhook envelope as delivered by the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CashfreeWebhookEnvelope {
    /// Event type (e.g., "PAYMENT_SUCCESS_WEBHOOK",
    /// "SUBSCRIPTION_STATUS_CHANGED").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Event ID for idempotent processing.
    #[serde(default)]
    pub event_id: Option<String>,

    /// Unix timestamp the event occurred.
    #[serde(default)]
    pub event_time: Option<i64>,

    pub data: CashfreeWebhookData,
}

/// Webhook payload body. One of `order` or `subscription` is present
/// depending on the event type.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CashfreeWebhookData {
    #[serde(default)]
    pub order: Option<CashfreeWebhookOrder>,

    #[serde(default)]
    pub subscription: Option<CashfreeWebhookSubscription>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CashfreeWebhookOrder {
    pub order_id: String,
    pub order_status: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CashfreeWebhookSubscription {
    pub subscription_id: String,
    pub subscription_status: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Hex Helpers
// ════════════════════════════════════════════════════════════════════════════════

/// Decode a hex string to bytes.
pub fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return None;
    }

    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for i in (0..hex.len()).step_by(2) {
        let byte = u8::from_str_radix(&hex[i..i + 2], 16).ok()?;
        bytes.push(byte);
    }
    Some(bytes)
}

/// Encode bytes to hex string.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_active_means_unpaid() {
        assert_eq!(map_order_status("ACTIVE"), OrderStatus::Pending);
        assert_eq!(map_order_status("PAID"), OrderStatus::Active);
    }

    #[test]
    fn bank_approval_pending_stays_distinct() {
        assert_eq!(
            map_subscription_status("BANK_APPROVAL_PENDING"),
            OrderStatus::BankApprovalPending
        );
    }

    #[test]
    fn unknown_statuses_map_to_pending() {
        assert_eq!(map_order_status("SOME_NEW_STATUS"), OrderStatus::Pending);
        assert_eq!(
            map_subscription_status("SOME_NEW_STATUS"),
            OrderStatus::Pending
        );
    }

    #[test]
    fn terminal_statuses_map_correctly() {
        assert_eq!(map_order_status("EXPIRED"), OrderStatus::Cancelled);
        assert_eq!(map_order_status("FAILED"), OrderStatus::Failed);
        assert_eq!(map_subscription_status("CANCELLED"), OrderStatus::Cancelled);
        assert_eq!(map_subscription_status("FAILED"), OrderStatus::Failed);
    }

    #[test]
    fn hex_roundtrip() {
        let original = vec![0xde, 0xad, 0xbe, 0xef];
        let encoded = hex_encode(&original);
        assert_eq!(encoded, "deadbeef");
        assert_eq!(hex_decode(&encoded).unwrap(), original);
    }

    #[test]
    fn hex_decode_rejects_odd_length_and_non_hex() {
        assert!(hex_decode("abc").is_none());
        assert!(hex_decode("zz").is_none());
    }

    #[test]
    fn parse_order_webhook_envelope() {
        let json = r#"{
            "type": "PAYMENT_SUCCESS_WEBHOOK",
            "event_id": "evt_123",
            "event_time": 1704067200,
            "data": {
                "order": {
                    "order_id": "ord_abc",
                    "order_status": "PAID"
                }
            }
        }"#;

        let envelope: CashfreeWebhookEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.event_type, "PAYMENT_SUCCESS_WEBHOOK");
        let order = envelope.data.order.unwrap();
        assert_eq!(order.order_id, "ord_abc");
        assert_eq!(map_order_status(&order.order_status), OrderStatus::Active);
    }

    #[test]
    fn parse_subscription_webhook_envelope() {
        let json = r#"{
            "type": "SUBSCRIPTION_STATUS_CHANGED",
            "data": {
                "subscription": {
                    "subscription_id": "sub_xyz",
                    "subscription_status": "BANK_APPROVAL_PENDING"
                }
            }
        }"#;

        let envelope: CashfreeWebhookEnvelope = serde_json::from_str(json).unwrap();
        let sub = envelope.data.subscription.unwrap();
        assert_eq!(
            map_subscription_status(&sub.subscription_status),
            OrderStatus::BankApprovalPending
        );
    }

    #[test]
    fn parse_order_response_without_invite_links() {
        let json = r#"{
            "order_id": "ord_1",
            "cf_order_id": "cf_9",
            "payment_session_id": "session_abc",
            "order_status": "ACTIVE",
            "order_expiry_time": 1704153600
        }"#;

        let resp: CashfreeOrderResponse = serde_json::from_str(json).unwrap();
        assert!(resp.invite_links.is_empty());
        assert_eq!(resp.payment_session_id.as_deref(), Some("session_abc"));
    }
}
