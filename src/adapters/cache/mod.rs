//! Entitlement cache adapters.

mod in_memory_entitlement_cache;
mod redis_entitlement_cache;
mod tiered_entitlement_cache;

pub use in_memory_entitlement_cache::InMemoryEntitlementCache;
pub use redis_entitlement_cache::RedisEntitlementCache;
pub use tiered_entitlement_cache::TieredEntitlementCache;
