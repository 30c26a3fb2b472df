//! Coupon domain - discount codes validated against an external registry.

mod coupon;

pub use coupon::{CouponApplication, CouponError, Discount, DiscountType};
