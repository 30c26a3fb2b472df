//! The checkout flow state machine.
//!
//! A `FlowState` is the durable, step-tagged record of an in-progress
//! checkout. It must survive the full-page redirect to the payment
//! gateway's domain and back, so it is persisted through the flow store
//! before any handoff.
//!
//! Steps carry only the data valid for that step: a gateway session id
//! exists only once the order is created, invite links only on success.

use serde::{Deserialize, Serialize};

use crate::domain::checkout::OrderReference;
use crate::domain::foundation::{
    CheckoutId, DocumentId, GatewaySessionId, Timestamp, UserId, ValidationError,
};
use crate::domain::plan::PlanSelection;

/// Discriminant of a flow step, used for ordering and transition checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Plan,
    Auth,
    Consent,
    Order,
    GatewayRedirect,
    Verifying,
    Success,
    Failed,
}

impl StepKind {
    /// Position along the happy path. `Failed` has no position.
    fn ordinal(&self) -> Option<u8> {
        match self {
            StepKind::Plan => Some(0),
            StepKind::Auth => Some(1),
            StepKind::Consent => Some(2),
            StepKind::Order => Some(3),
            StepKind::GatewayRedirect => Some(4),
            StepKind::Verifying => Some(5),
            StepKind::Success => Some(6),
            StepKind::Failed => None,
        }
    }
}

/// The current step of a checkout flow, tagged with step-specific data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum FlowStep {
    /// Plan chosen, nothing else done yet.
    Plan,
    /// Waiting for the user to log in or register.
    Auth,
    /// Obtaining the signed e-mandate (autopay cycles only).
    Consent {
        #[serde(default)]
        document_id: Option<DocumentId>,
    },
    /// Ready to create the order/subscription. `document_id` is the signed
    /// consent for autopay flows, `None` for one-time purchases.
    Order {
        #[serde(default)]
        document_id: Option<DocumentId>,
    },
    /// Handed off to the gateway's hosted checkout. The session, hosted
    /// URL and resume URL are all persisted before the redirect leaves
    /// the app.
    GatewayRedirect {
        session_id: GatewaySessionId,
        reference: OrderReference,
        checkout_url: String,
        resume_url: String,
    },
    /// Returned from the gateway; verifying final status.
    Verifying { reference: OrderReference },
    /// Terminal: subscription active.
    Success {
        reference: OrderReference,
        #[serde(default)]
        invite_links: Vec<String>,
    },
    /// Terminal or recoverable error. `resume` is the step to re-enter on
    /// retry, preserved so retrying an order does not lose the signed
    /// consent document.
    Failed {
        message: String,
        recoverable: bool,
        resume: Option<Box<FlowStep>>,
    },
}

impl FlowStep {
    pub fn kind(&self) -> StepKind {
        match self {
            FlowStep::Plan => StepKind::Plan,
            FlowStep::Auth => StepKind::Auth,
            FlowStep::Consent { .. } => StepKind::Consent,
            FlowStep::Order { .. } => StepKind::Order,
            FlowStep::GatewayRedirect { .. } => StepKind::GatewayRedirect,
            FlowStep::Verifying { .. } => StepKind::Verifying,
            FlowStep::Success { .. } => StepKind::Success,
            FlowStep::Failed { .. } => StepKind::Failed,
        }
    }
}

/// A coupon applied to this checkout, with its precomputed amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub code: String,
    pub discount_minor: u64,
    pub final_amount_minor: u64,
}

/// Durable record of an in-progress checkout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowState {
    pub id: CheckoutId,
    /// Set once the auth gate confirms an identity.
    pub user_id: Option<UserId>,
    pub selection: PlanSelection,
    pub step: FlowStep,
    /// Coupon applied to this checkout, if any.
    #[serde(default)]
    pub coupon: Option<AppliedCoupon>,
    /// Human-readable message shown while a step's request is in flight.
    /// Also the double-submit guard: a step cannot begin processing twice.
    pub processing: Option<String>,
    pub created_at: Timestamp,
}

impl FlowState {
    /// Starts a new flow for a fresh selection. Starting a new selection
    /// invalidates any previous flow (callers overwrite by id or clear).
    pub fn new(selection: PlanSelection) -> Self {
        Self {
            id: CheckoutId::new(),
            user_id: None,
            selection,
            step: FlowStep::Plan,
            coupon: None,
            processing: None,
            created_at: Timestamp::now(),
        }
    }

    /// The amount payable in minor units, after any applied coupon.
    pub fn payable_minor(&self) -> u64 {
        self.coupon
            .as_ref()
            .map(|c| c.final_amount_minor)
            .unwrap_or(self.selection.price_minor)
    }

    /// Whether the flow's TTL has elapsed. Expired flows are treated as
    /// absent by the store.
    pub fn is_expired(&self, ttl_secs: u64) -> bool {
        self.created_at.elapsed().num_seconds() >= ttl_secs as i64
    }

    /// Advances to the next step, enforcing the strict forward ordering
    /// Plan -> Auth -> Consent -> Order -> GatewayRedirect -> Verifying ->
    /// Success. The consent step is skipped (Auth -> Order) for cycles
    /// that do not require a mandate, and required for those that do.
    pub fn advance(&mut self, next: FlowStep) -> Result<(), ValidationError> {
        let current = self.step.kind();
        let target = next.kind();

        let (Some(from), Some(to)) = (current.ordinal(), target.ordinal()) else {
            return Err(ValidationError::invalid_format(
                "flow_step",
                format!("cannot advance from {:?} to {:?}", current, target),
            ));
        };

        let allowed = if to == from + 1 {
            // Entering Consent is only valid for autopay flows.
            target != StepKind::Consent || self.selection.is_autopay_flow
        } else if current == StepKind::Auth && target == StepKind::Order {
            // Consent skip, only for non-mandate cycles.
            !self.selection.is_autopay_flow
        } else {
            false
        };

        if !allowed {
            return Err(ValidationError::invalid_format(
                "flow_step",
                format!(
                    "cannot advance from {:?} to {:?} (autopay={})",
                    current, target, self.selection.is_autopay_flow
                ),
            ));
        }

        // Autopay orders must carry the signed consent document.
        if self.selection.is_autopay_flow {
            if let FlowStep::Order { document_id: None } = next {
                return Err(ValidationError::empty_field("document_id"));
            }
        }

        self.step = next;
        self.processing = None;
        Ok(())
    }

    /// Records a failure from any step. The previous step is captured so a
    /// recoverable failure can be retried in place. Failing an already
    /// failed flow (verify and webhook can both report the same outcome)
    /// keeps the original resume point.
    pub fn fail(&mut self, message: impl Into<String>, recoverable: bool) {
        let resume = match &self.step {
            FlowStep::Failed { resume, .. } => resume.clone(),
            step if recoverable => Some(Box::new(step.clone())),
            _ => None,
        };
        self.step = FlowStep::Failed {
            message: message.into(),
            recoverable,
            resume,
        };
        self.processing = None;
    }

    /// Re-enters the step that failed. Only valid for recoverable failures.
    pub fn retry(&mut self) -> Result<(), ValidationError> {
        match &self.step {
            FlowStep::Failed {
                recoverable: true,
                resume: Some(step),
                ..
            } => {
                self.step = (**step).clone();
                self.processing = None;
                Ok(())
            }
            FlowStep::Failed { .. } => Err(ValidationError::invalid_format(
                "flow_step",
                "failure is not retryable; restart the checkout",
            )),
            _ => Err(ValidationError::invalid_format(
                "flow_step",
                "nothing to retry",
            )),
        }
    }

    /// Abandons the current attempt and returns to plan selection.
    ///
    /// Cancelling only abandons the client-side wait; any in-flight
    /// external operation may still complete and is reconciled later by
    /// verification or a webhook.
    pub fn cancel(&mut self) {
        self.step = FlowStep::Plan;
        self.processing = None;
    }

    /// Marks a step's request as in flight. Rejects re-entry while a
    /// request is already processing (the "user clicks proceed twice"
    /// guard).
    pub fn begin_processing(&mut self, message: impl Into<String>) -> Result<(), ValidationError> {
        if self.processing.is_some() {
            return Err(ValidationError::invalid_format(
                "flow_step",
                "a request for this step is already in flight",
            ));
        }
        self.processing = Some(message.into());
        Ok(())
    }

    /// Clears the in-flight marker without changing the step.
    pub fn end_processing(&mut self) {
        self.processing = None;
    }
}
