//! Coupon application and pure discount computation.
//!
//! Coupons are fetched read-only from an external registry and applied
//! locally to compute a discounted amount. Eligibility is checked here,
//! before any network call, so an order below the minimum value never
//! reaches the backend.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the discount value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `discount_value` is a percentage of the order amount (0-100).
    Percentage,
    /// `discount_value` is a flat amount in minor units.
    Fixed,
}

/// A validated coupon as returned by the coupon registry.
///
/// Never mutated locally; applying it is a pure computation over the
/// order amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponApplication {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: u64,
    /// Minimum order amount (minor units) required to use the coupon.
    #[serde(default)]
    pub min_order_value: u64,
    /// Cap on the computed discount (minor units), if any.
    #[serde(default)]
    pub max_discount_amount: Option<u64>,
}

/// Result of applying a coupon to an order amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    /// Amount subtracted, in minor units.
    pub discount_minor: u64,
    /// Amount payable after discount, in minor units.
    pub final_amount_minor: u64,
}

/// Reasons a coupon cannot be applied to an order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    #[error("Order amount {amount} is below the minimum order value {minimum} for this coupon")]
    MinimumOrderValue { amount: u64, minimum: u64 },

    #[error("Coupon percentage {0} exceeds 100")]
    InvalidPercentage(u64),
}

impl CouponApplication {
    /// Applies the coupon to an order amount in minor units.
    ///
    /// Pure and idempotent: the same coupon and amount always produce the
    /// same discount. Percentage discounts are capped at
    /// `max_discount_amount`; fixed discounts are capped at the order
    /// amount so the final total is never negative.
    pub fn apply(&self, amount_minor: u64) -> Result<Discount, CouponError> {
        if amount_minor < self.min_order_value {
            return Err(CouponError::MinimumOrderValue {
                amount: amount_minor,
                minimum: self.min_order_value,
            });
        }

        let raw_discount = match self.discount_type {
            DiscountType::Percentage => {
                if self.discount_value > 100 {
                    return Err(CouponError::InvalidPercentage(self.discount_value));
                }
                // Widen before multiplying: amount * percentage can
                // overflow u64 near the top of the range. The quotient
                // is at most amount_minor, so the narrowing is exact.
                (amount_minor as u128 * self.discount_value as u128 / 100) as u64
            }
            DiscountType::Fixed => self.discount_value,
        };

        let capped = match self.max_discount_amount {
            Some(cap) => raw_discount.min(cap),
            None => raw_discount,
        };
        let discount_minor = capped.min(amount_minor);

        Ok(Discount {
            discount_minor,
            final_amount_minor: amount_minor - discount_minor,
        })
    }
}
