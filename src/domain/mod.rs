//! Domain layer - pure types and rules, no I/O.

pub mod checkout;
pub mod coupon;
pub mod foundation;
pub mod plan;
