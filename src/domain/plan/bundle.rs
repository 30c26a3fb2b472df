//! Purchasable bundle with per-cycle pricing.

use serde::{Deserialize, Serialize};

use super::BillingCycle;
use crate::domain::foundation::BundleId;

/// Per-cycle prices for a bundle, in minor currency units (paise).
///
/// Prices are optional: a bundle may not offer every cycle. A missing
/// price resolves to 0 rather than an error, matching the pricing-table
/// lookup contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CyclePricing {
    #[serde(default)]
    pub monthly: Option<u64>,
    #[serde(default)]
    pub monthly_autopay: Option<u64>,
    #[serde(default)]
    pub quarterly: Option<u64>,
    #[serde(default)]
    pub yearly: Option<u64>,
}

/// A purchasable product grouping (subscription tier) with per-cycle pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub id: BundleId,
    pub name: String,
    pub pricing: CyclePricing,
}

impl Bundle {
    pub fn new(id: BundleId, name: impl Into<String>, pricing: CyclePricing) -> Self {
        Self {
            id,
            name: name.into(),
            pricing,
        }
    }

    /// Price for the given cycle in minor units.
    ///
    /// Pure lookup; a missing price defaults to 0 instead of failing.
    pub fn price_for(&self, cycle: BillingCycle) -> u64 {
        let price = match cycle {
            BillingCycle::Monthly => self.pricing.monthly,
            BillingCycle::MonthlyAutopay => self.pricing.monthly_autopay,
            BillingCycle::Quarterly => self.pricing.quarterly,
            BillingCycle::Yearly => self.pricing.yearly,
        };
        price.unwrap_or(0)
    }
}
