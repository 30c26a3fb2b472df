//! Plan domain - purchasable bundles, billing cycles, and plan selection.

mod billing_cycle;
mod bundle;
mod selection;

pub use billing_cycle::BillingCycle;
pub use bundle::{Bundle, CyclePricing};
pub use selection::PlanSelection;
