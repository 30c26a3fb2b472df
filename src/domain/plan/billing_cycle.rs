//! Billing cycle for a plan selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Billing cycle chosen at plan selection.
///
/// `MonthlyAutopay` and `Yearly` are routed through the e-mandate flow:
/// both require a signed authorization before the recurring charge can be
/// set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    Monthly,
    MonthlyAutopay,
    Quarterly,
    Yearly,
}

impl BillingCycle {
    /// Whether this cycle requires a signed e-mandate before checkout.
    pub fn requires_mandate(&self) -> bool {
        matches!(self, BillingCycle::MonthlyAutopay | BillingCycle::Yearly)
    }

    /// Recurring charge interval in days, used for mandate setup.
    pub fn interval_days(&self) -> u32 {
        match self {
            BillingCycle::Monthly | BillingCycle::MonthlyAutopay => 30,
            BillingCycle::Quarterly => 90,
            BillingCycle::Yearly => 365,
        }
    }

    /// All cycles, in display order.
    pub fn all() -> [BillingCycle; 4] {
        [
            BillingCycle::Monthly,
            BillingCycle::MonthlyAutopay,
            BillingCycle::Quarterly,
            BillingCycle::Yearly,
        ]
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::MonthlyAutopay => "monthly_autopay",
            BillingCycle::Quarterly => "quarterly",
            BillingCycle::Yearly => "yearly",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for BillingCycle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(BillingCycle::Monthly),
            "monthly_autopay" => Ok(BillingCycle::MonthlyAutopay),
            "quarterly" => Ok(BillingCycle::Quarterly),
            "yearly" => Ok(BillingCycle::Yearly),
            other => Err(ValidationError::invalid_format(
                "billing_cycle",
                format!("unknown cycle '{}'", other),
            )),
        }
    }
}
