//! Coupon registry port - read-only lookup of coupon definitions.
//!
//! The registry is the source of truth for coupon terms; the discount
//! math itself is pure and lives in the domain.

use async_trait::async_trait;

use crate::domain::coupon::CouponApplication;
use crate::domain::foundation::{BundleId, DomainError, ErrorCode};

/// Errors from coupon lookup.
#[derive(Debug, thiserror::Error)]
pub enum CouponLookupError {
    #[error("Coupon code '{0}' is not valid")]
    NotFound(String),

    #[error("Coupon code '{0}' is not applicable to this plan")]
    NotApplicable(String),

    #[error("Coupon registry unavailable: {0}")]
    Unavailable(String),
}

impl From<CouponLookupError> for DomainError {
    fn from(err: CouponLookupError) -> Self {
        let code = match err {
            CouponLookupError::NotFound(_) | CouponLookupError::NotApplicable(_) => {
                ErrorCode::CouponNotFound
            }
            CouponLookupError::Unavailable(_) => ErrorCode::ExternalServiceError,
        };
        DomainError::new(code, err.to_string())
    }
}

/// Port for looking up coupon definitions.
#[async_trait]
pub trait CouponRegistry: Send + Sync {
    /// Resolve a coupon code for a bundle. Codes are matched
    /// case-insensitively.
    async fn lookup(
        &self,
        code: &str,
        bundle_id: &BundleId,
    ) -> Result<CouponApplication, CouponLookupError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coupon_registry_is_object_safe() {
        fn _accepts_dyn(_registry: &dyn CouponRegistry) {}
    }

    #[test]
    fn unknown_and_inapplicable_codes_share_a_user_facing_code() {
        let unknown: DomainError = CouponLookupError::NotFound("NOPE".to_string()).into();
        let inapplicable: DomainError =
            CouponLookupError::NotApplicable("ELSEWHERE".to_string()).into();
        assert_eq!(unknown.code, ErrorCode::CouponNotFound);
        assert_eq!(inapplicable.code, ErrorCode::CouponNotFound);
    }
}
