//! Checkout flow tuning

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Bounds for the flow-state TTL. Shorter than the lower bound and users
/// lose their flow mid-signing; longer than the upper bound and abandoned
/// carts pin gateway orders for too long.
const FLOW_TTL_MIN_SECS: u64 = 1_800;
const FLOW_TTL_MAX_SECS: u64 = 3_600;

/// Checkout flow configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutConfig {
    /// How long an idle flow survives in the store, in seconds
    #[serde(default = "default_flow_ttl_secs")]
    pub flow_ttl_secs: u64,

    /// How long a cached entitlement snapshot stays fresh, in seconds
    #[serde(default = "default_entitlement_ttl_secs")]
    pub entitlement_ttl_secs: u64,

    /// How many times to poll the gateway while verification is pending
    #[serde(default = "default_verify_max_attempts")]
    pub verify_max_attempts: u32,

    /// Delay between verification polls, in seconds
    #[serde(default = "default_verify_backoff_secs")]
    pub verify_backoff_secs: u64,
}

impl CheckoutConfig {
    /// Delay between verification polls as a Duration
    pub fn verify_backoff(&self) -> Duration {
        Duration::from_secs(self.verify_backoff_secs)
    }

    /// Validate checkout configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(FLOW_TTL_MIN_SECS..=FLOW_TTL_MAX_SECS).contains(&self.flow_ttl_secs) {
            return Err(ValidationError::FlowTtlOutOfRange {
                min: FLOW_TTL_MIN_SECS,
                max: FLOW_TTL_MAX_SECS,
                actual: self.flow_ttl_secs,
            });
        }
        if self.verify_max_attempts == 0 {
            return Err(ValidationError::InvalidPollAttempts);
        }
        Ok(())
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            flow_ttl_secs: default_flow_ttl_secs(),
            entitlement_ttl_secs: default_entitlement_ttl_secs(),
            verify_max_attempts: default_verify_max_attempts(),
            verify_backoff_secs: default_verify_backoff_secs(),
        }
    }
}

fn default_flow_ttl_secs() -> u64 {
    2_700
}

fn default_entitlement_ttl_secs() -> u64 {
    300
}

fn default_verify_max_attempts() -> u32 {
    5
}

fn default_verify_backoff_secs() -> u64 {
    3
}
