//! Plan selection - the immutable record of what the user is buying.

use serde::{Deserialize, Serialize};

use super::{BillingCycle, Bundle};
use crate::domain::foundation::BundleId;

/// The user's chosen bundle and billing cycle.
///
/// Created when the user picks a plan and immutable once payment begins;
/// owned exclusively by the flow state for the duration of the checkout
/// session. `price_minor` is always the undiscounted cycle price; coupon
/// discounts are computed against it at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSelection {
    pub bundle_id: BundleId,
    pub bundle_name: String,
    pub cycle: BillingCycle,
    /// Price in minor currency units, always >= 0 (missing prices are 0).
    pub price_minor: u64,
    /// True iff the cycle requires a signed mandate before recurring debit.
    pub is_autopay_flow: bool,
}

impl PlanSelection {
    /// Derives a selection from a bundle and cycle.
    ///
    /// Pure: no network calls, no failure modes. The autopay discriminator
    /// comes solely from the billing cycle.
    pub fn select(bundle: &Bundle, cycle: BillingCycle) -> Self {
        Self {
            bundle_id: bundle.id.clone(),
            bundle_name: bundle.name.clone(),
            cycle,
            price_minor: bundle.price_for(cycle),
            is_autopay_flow: cycle.requires_mandate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::CyclePricing;
    use proptest::prelude::*;

    fn bundle_with(pricing: CyclePricing) -> Bundle {
        Bundle::new(BundleId::new("wealth-pro").unwrap(), "Wealth Pro", pricing)
    }

    #[test]
    fn select_copies_bundle_identity_and_price() {
        let bundle = bundle_with(CyclePricing {
            quarterly: Some(129_900),
            ..Default::default()
        });
        let selection = PlanSelection::select(&bundle, BillingCycle::Quarterly);

        assert_eq!(selection.bundle_id.as_str(), "wealth-pro");
        assert_eq!(selection.bundle_name, "Wealth Pro");
        assert_eq!(selection.price_minor, 129_900);
        assert!(!selection.is_autopay_flow);
    }

    #[test]
    fn autopay_flow_set_for_mandate_cycles_only() {
        let bundle = bundle_with(CyclePricing::default());
        for cycle in BillingCycle::all() {
            let selection = PlanSelection::select(&bundle, cycle);
            assert_eq!(
                selection.is_autopay_flow,
                matches!(cycle, BillingCycle::MonthlyAutopay | BillingCycle::Yearly),
                "is_autopay_flow mismatch for {:?}",
                cycle
            );
        }
    }

    proptest! {
        // For all pricing tables and cycles, the derived price is the table
        // entry or 0, and the autopay discriminator tracks the cycle.
        #[test]
        fn select_price_is_table_entry_or_zero(
            monthly in proptest::option::of(0u64..10_000_000),
            monthly_autopay in proptest::option::of(0u64..10_000_000),
            quarterly in proptest::option::of(0u64..10_000_000),
            yearly in proptest::option::of(0u64..10_000_000),
            cycle_idx in 0usize..4,
        ) {
            let pricing = CyclePricing { monthly, monthly_autopay, quarterly, yearly };
            let bundle = bundle_with(pricing.clone());
            let cycle = BillingCycle::all()[cycle_idx];
            let selection = PlanSelection::select(&bundle, cycle);

            let expected = match cycle {
                BillingCycle::Monthly => pricing.monthly,
                BillingCycle::MonthlyAutopay => pricing.monthly_autopay,
                BillingCycle::Quarterly => pricing.quarterly,
                BillingCycle::Yearly => pricing.yearly,
            }.unwrap_or(0);

            prop_assert_eq!(selection.price_minor, expected);
            prop_assert_eq!(selection.is_autopay_flow, cycle.requires_mandate());
        }
    }
}
