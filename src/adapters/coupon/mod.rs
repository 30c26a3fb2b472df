//! Coupon registry adapters.

mod rest_registry;
mod static_registry;

pub use rest_registry::{RestCouponRegistry, RestCouponRegistryConfig};
pub use static_registry::StaticCouponRegistry;
