//! Scriptable mock gateway for tests and local development.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::checkout::{OrderReference, OrderStatus};
use crate::domain::foundation::{GatewaySessionId, OrderId, SubscriptionId};
use crate::ports::{
    CreateMandateRequest, CreateOrderRequest, GatewayError, GatewaySession, GatewayStatus,
    PaymentGateway, WebhookEvent,
};

/// In-memory gateway that returns canned responses.
///
/// The status script is consumed one entry per `verify` call, so a test
/// can model a subscription that is pending on the first poll and active
/// on the second.
pub struct MockGateway {
    status_script: Mutex<Vec<(OrderStatus, String)>>,
    invite_links: Vec<String>,
    fail_create: Mutex<Option<GatewayError>>,
    verify_calls: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            status_script: Mutex::new(vec![(OrderStatus::Active, "PAID".to_string())]),
            invite_links: vec!["https://t.me/+invite".to_string()],
            fail_create: Mutex::new(None),
            verify_calls: AtomicUsize::new(0),
        }
    }

    /// Replace the verify script. The last entry repeats once exhausted.
    pub fn with_status_script(self, script: Vec<(OrderStatus, &str)>) -> Self {
        *self.status_script.lock().unwrap() = script
            .into_iter()
            .map(|(s, raw)| (s, raw.to_string()))
            .collect();
        self
    }

    pub fn with_invite_links(mut self, links: Vec<String>) -> Self {
        self.invite_links = links;
        self
    }

    /// Make the next create call fail with the given error.
    pub fn failing_create(self, error: GatewayError) -> Self {
        *self.fail_create.lock().unwrap() = Some(error);
        self
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    fn next_status(&self) -> (OrderStatus, String) {
        let mut script = self.status_script.lock().unwrap();
        if script.len() > 1 {
            script.remove(0)
        } else {
            script[0].clone()
        }
    }

    fn take_create_failure(&self) -> Option<GatewayError> {
        self.fail_create.lock().unwrap().take()
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_order(
        &self,
        _request: CreateOrderRequest,
    ) -> Result<GatewaySession, GatewayError> {
        if let Some(err) = self.take_create_failure() {
            return Err(err);
        }
        Ok(GatewaySession {
            session_id: GatewaySessionId::new("session_mock").unwrap(),
            reference: OrderReference::Order(OrderId::new("ord_mock").unwrap()),
            checkout_url: "https://gateway.test/checkout/session_mock".to_string(),
            expires_at: None,
        })
    }

    async fn create_mandate(
        &self,
        _request: CreateMandateRequest,
    ) -> Result<GatewaySession, GatewayError> {
        if let Some(err) = self.take_create_failure() {
            return Err(err);
        }
        Ok(GatewaySession {
            session_id: GatewaySessionId::new("session_mock").unwrap(),
            reference: OrderReference::Subscription(SubscriptionId::new("sub_mock").unwrap()),
            checkout_url: "https://gateway.test/subscription/session_mock".to_string(),
            expires_at: None,
        })
    }

    async fn verify(&self, reference: &OrderReference) -> Result<GatewayStatus, GatewayError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        let (status, raw_status) = self.next_status();
        let invite_links = if status == OrderStatus::Active {
            self.invite_links.clone()
        } else {
            vec![]
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
        _signature: &str,
        _timestamp: &str,
    ) -> Result<WebhookEvent, GatewayError> {
        let value: serde_json::Value = serde_json::from_slice(payload)
            .map_err(|e| GatewayError::invalid_webhook(e.to_string()))?;
        let order_id = value["data"]["order"]["order_id"]
            .as_str()
            .unwrap_or("ord_mock");
        Ok(WebhookEvent {
            id: "evt_mock".to_string(),
            reference: OrderReference::Order(
                OrderId::new(order_id).map_err(|e| GatewayError::invalid_webhook(e.to_string()))?,
            ),
            status: OrderStatus::Active,
            raw_status: "PAID".to_string(),
            occurred_at: chrono::Utc::now().timestamp(),
        })
    }
}
