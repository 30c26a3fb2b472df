//! Order/subscription status lifecycle and verification outcomes.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OrderId, StateMachine, SubscriptionId};

/// Status of an order or subscription as reported by the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Created,
    Pending,
    /// Bank has not yet approved the mandate/payment. Not a failure:
    /// approval can take minutes to days.
    BankApprovalPending,
    Active,
    Failed,
    Cancelled,
}

impl StateMachine for OrderStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use OrderStatus::*;
        matches!(
            (self, target),
            (Created, Pending)
                | (Created, BankApprovalPending)
                | (Created, Active)
                | (Created, Failed)
                | (Created, Cancelled)
                | (Pending, BankApprovalPending)
                | (Pending, Active)
                | (Pending, Failed)
                | (Pending, Cancelled)
                | (BankApprovalPending, Active)
                | (BankApprovalPending, Failed)
                | (BankApprovalPending, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use OrderStatus::*;
        match self {
            Created => vec![Pending, BankApprovalPending, Active, Failed, Cancelled],
            Pending => vec![BankApprovalPending, Active, Failed, Cancelled],
            BankApprovalPending => vec![Active, Failed, Cancelled],
            Active | Failed | Cancelled => vec![],
        }
    }
}

impl OrderStatus {
    /// Whether the subscription is usable.
    pub fn has_access(&self) -> bool {
        matches!(self, OrderStatus::Active)
    }

    /// Whether the status is still awaiting an external decision.
    pub fn is_indeterminate(&self) -> bool {
        matches!(
            self,
            OrderStatus::Created | OrderStatus::Pending | OrderStatus::BankApprovalPending
        )
    }
}

/// Reference to the gateway-side record created for a checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum OrderReference {
    /// One-time purchase order.
    Order(OrderId),
    /// Recurring subscription (mandate-backed).
    Subscription(SubscriptionId),
}

impl OrderReference {
    /// The raw identifier string, for logging and gateway lookups.
    pub fn id_str(&self) -> &str {
        match self {
            OrderReference::Order(id) => id.as_str(),
            OrderReference::Subscription(id) => id.as_str(),
        }
    }

    /// True for mandate-backed subscriptions.
    pub fn is_subscription(&self) -> bool {
        matches!(self, OrderReference::Subscription(_))
    }
}

/// Outcome of verifying an order/subscription after checkout return.
///
/// A tagged union so activation artifacts can only exist alongside a
/// successful status: invite links with a failed payment are
/// unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationOutcome {
    /// Subscription is active; activation artifacts attached.
    Active {
        #[serde(default)]
        invite_links: Vec<String>,
    },
    /// Not yet final (e.g. bank approval pending). The flow state is
    /// retained and a manual recheck is offered.
    Pending { gateway_status: String },
    /// Terminal failure; the user must restart.
    Failed { message: String },
    /// Cancelled by the user or the gateway.
    Cancelled,
}

impl VerificationOutcome {
    /// Maps a gateway-reported status to an outcome.
    pub fn from_gateway(status: OrderStatus, raw_status: &str, invite_links: Vec<String>) -> Self {
        match status {
            OrderStatus::Active => VerificationOutcome::Active { invite_links },
            OrderStatus::Created | OrderStatus::Pending | OrderStatus::BankApprovalPending => {
                VerificationOutcome::Pending {
                    gateway_status: raw_status.to_string(),
                }
            }
            OrderStatus::Failed => VerificationOutcome::Failed {
                message: format!("Payment failed ({})", raw_status),
            },
            OrderStatus::Cancelled => VerificationOutcome::Cancelled,
        }
    }

    /// True when the checkout session is over and flow state may be cleared.
    pub fn is_success(&self) -> bool {
        matches!(self, VerificationOutcome::Active { .. })
    }
}
