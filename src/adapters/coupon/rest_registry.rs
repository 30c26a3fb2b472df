//! REST adapter for the coupon service.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::coupon::{CouponApplication, DiscountType};
use crate::domain::foundation::BundleId;
use crate::ports::{CouponLookupError, CouponRegistry};

/// Coupon service configuration.
#[derive(Clone)]
pub struct RestCouponRegistryConfig {
    api_base_url: String,
}

impl RestCouponRegistryConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
        }
    }
}

/// REST client for the coupon service.
pub struct RestCouponRegistry {
    config: RestCouponRegistryConfig,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct CouponResponse {
    code: String,
    discount_type: String,
    discount_value: u64,
    #[serde(default)]
    min_order_value: u64,
    #[serde(default)]
    max_discount_amount: Option<u64>,
    #[serde(default)]
    applicable_bundles: Vec<String>,
}

impl RestCouponRegistry {
    pub fn new(config: RestCouponRegistryConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CouponRegistry for RestCouponRegistry {
    async fn lookup(
        &self,
        code: &str,
        bundle_id: &BundleId,
    ) -> Result<CouponApplication, CouponLookupError> {
        let normalized = code.trim().to_uppercase();
        let url = format!("{}/coupons/{}", self.config.api_base_url, normalized);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| CouponLookupError::Unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CouponLookupError::NotFound(normalized));
        }

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CouponLookupError::Unavailable(text));
        }

        let coupon: CouponResponse = response
            .json()
            .await
            .map_err(|e| CouponLookupError::Unavailable(format!("Unparseable response: {}", e)))?;

        // An empty applicability list means the coupon is valid everywhere.
        if !coupon.applicable_bundles.is_empty()
            && !coupon
                .applicable_bundles
                .iter()
                .any(|b| b == bundle_id.as_str())
        {
            return Err(CouponLookupError::NotApplicable(normalized));
        }

        let discount_type = match coupon.discount_type.as_str() {
            "percentage" => DiscountType::Percentage,
            "fixed" => DiscountType::Fixed,
            other => {
                return Err(CouponLookupError::Unavailable(format!(
                    "Unknown discount type: {}",
                    other
                )))
            }
        };

        Ok(CouponApplication {
            code: coupon.code,
            discount_type,
            discount_value: coupon.discount_value,
            min_order_value: coupon.min_order_value,
            max_discount_amount: coupon.max_discount_amount,
        })
    }
}
