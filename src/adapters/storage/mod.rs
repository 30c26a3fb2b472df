//! Flow store adapters.

mod in_memory_flow_store;
mod redis_flow_store;

pub use in_memory_flow_store::InMemoryFlowStore;
pub use redis_flow_store::RedisFlowStore;
