//! Static in-memory coupon registry for tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::coupon::CouponApplication;
use crate::domain::foundation::BundleId;
use crate::ports::{CouponLookupError, CouponRegistry};

/// Registry backed by a fixed code table. Lookup is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct StaticCouponRegistry {
    coupons: HashMap<String, CouponApplication>,
}

impl StaticCouponRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_coupon(mut self, coupon: CouponApplication) -> Self {
        self.coupons.insert(coupon.code.to_uppercase(), coupon);
        self
    }
}

#[async_trait]
impl CouponRegistry for StaticCouponRegistry {
    async fn lookup(
        &self,
        code: &str,
        _bundle_id: &BundleId,
    ) -> Result<CouponApplication, CouponLookupError> {
        let normalized = code.trim().to_uppercase();
        self.coupons
            .get(&normalized)
            .cloned()
            .ok_or(CouponLookupError::NotFound(normalized))
    }
}
