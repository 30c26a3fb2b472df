//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment
//! variables using the `config` and `dotenvy` crates. Configuration is
//! loaded with the `ARTHAFLOW_` prefix and nested values use double
//! underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use arthaflow::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod checkout;
mod error;
mod gateway;
mod providers;
mod redis;
mod server;

pub use checkout::CheckoutConfig;
pub use error::{ConfigError, ValidationError};
pub use gateway::GatewayConfig;
pub use providers::{CatalogConfig, CouponConfig, EsignConfig, IdentityConfig};
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Contains all configuration sections for the checkout service.
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Redis configuration (flow-state store, entitlement cache)
    #[serde(default)]
    pub redis: RedisConfig,

    /// Payment gateway configuration (Cashfree)
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// eSign/consent provider configuration
    #[serde(default)]
    pub esign: EsignConfig,

    /// Identity provider configuration
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Coupon service configuration
    #[serde(default)]
    pub coupon: CouponConfig,

    /// Plan catalog configuration
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Checkout flow tuning (TTLs, verification polling)
    #[serde(default)]
    pub checkout: CheckoutConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ARTHAFLOW` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ARTHAFLOW__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `ARTHAFLOW__GATEWAY__CLIENT_ID=...` -> `gateway.client_id = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the expected
    /// types. Missing required values surface from [`AppConfig::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ARTHAFLOW")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Performs semantic validation of configuration:
    /// - URL formats and schemes
    /// - Required provider credentials
    /// - Flow TTL bounds and polling limits
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.redis.validate()?;
        self.gateway.validate()?;
        self.esign.validate()?;
        self.identity.validate()?;
        self.coupon.validate()?;
        self.checkout.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to set environment variables for testing
    /// Uses double underscores to separate nested config values
    fn set_minimal_env() {
        env::set_var("ARTHAFLOW__GATEWAY__CLIENT_ID", "cf_client");
        env::set_var("ARTHAFLOW__GATEWAY__CLIENT_SECRET", "cf_secret");
        env::set_var("ARTHAFLOW__GATEWAY__WEBHOOK_SECRET", "cf_webhook");
        env::set_var("ARTHAFLOW__ESIGN__API_KEY", "esign_key");
        env::set_var("ARTHAFLOW__ESIGN__API_BASE_URL", "https://esign.example.com");
        env::set_var(
            "ARTHAFLOW__IDENTITY__API_BASE_URL",
            "https://id.example.com",
        );
    }

    /// Helper to clear environment variables after testing
    fn clear_env() {
        env::remove_var("ARTHAFLOW__GATEWAY__CLIENT_ID");
        env::remove_var("ARTHAFLOW__GATEWAY__CLIENT_SECRET");
        env::remove_var("ARTHAFLOW__GATEWAY__WEBHOOK_SECRET");
        env::remove_var("ARTHAFLOW__ESIGN__API_KEY");
        env::remove_var("ARTHAFLOW__ESIGN__API_BASE_URL");
        env::remove_var("ARTHAFLOW__IDENTITY__API_BASE_URL");
        env::remove_var("ARTHAFLOW__SERVER__PORT");
        env::remove_var("ARTHAFLOW__SERVER__ENVIRONMENT");
        env::remove_var("ARTHAFLOW__CHECKOUT__FLOW_TTL_SECS");
    }

    #[test]
    fn load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.gateway.client_id, "cf_client");
        assert_eq!(config.identity.api_base_url, "https://id.example.com");
    }

    #[test]
    fn validate_full_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok());
        let config = result.unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn server_defaults_apply() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.checkout.flow_ttl_secs, 2_700);
    }

    #[test]
    fn production_environment_is_detected() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("ARTHAFLOW__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn flow_ttl_override_is_validated() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("ARTHAFLOW__CHECKOUT__FLOW_TTL_SECS", "600");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_gateway_credentials_fail_validation() {
        let config = AppConfig::default();
        assert!(config.validate().is_err());
    }
}
