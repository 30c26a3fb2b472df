//! Checkout domain - the multi-step flow state machine and its records.

mod consent;
mod flow_state;
mod order;
mod return_params;

pub use consent::{ConsentDocument, ConsentStatus, CONSENT_EXPIRY_MINUTES};
pub use flow_state::{AppliedCoupon, FlowState, FlowStep, StepKind};
pub use order::{OrderReference, OrderStatus, VerificationOutcome};
pub use return_params::{extract_return_token, RETURN_PARAM_KEYS};
