//! Payment gateway configuration (Cashfree)

use serde::Deserialize;

use super::error::ValidationError;

/// Payment gateway configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayConfig {
    /// Merchant client ID
    pub client_id: String,

    /// Merchant client secret
    pub client_secret: String,

    /// Webhook signing secret
    pub webhook_secret: String,

    /// Base URL for the gateway API; defaults to the sandbox environment
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl GatewayConfig {
    /// Check if pointed at the sandbox environment
    pub fn is_sandbox(&self) -> bool {
        self.api_base_url.contains("sandbox")
    }

    /// Validate gateway configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.client_id.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_CLIENT_ID"));
        }
        if self.client_secret.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_CLIENT_SECRET"));
        }
        if self.webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_WEBHOOK_SECRET"));
        }
        if !self.api_base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl("gateway"));
        }
        Ok(())
    }
}

fn default_api_base_url() -> String {
    "https://sandbox.cashfree.com/pg".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> GatewayConfig {
        GatewayConfig {
            client_id: "cf_client".to_string(),
            client_secret: "cf_secret".to_string(),
            webhook_secret: "cf_webhook".to_string(),
            api_base_url: default_api_base_url(),
        }
    }

    #[test]
    fn default_base_url_is_sandbox() {
        let config = valid_config();
        assert!(config.is_sandbox());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let config = GatewayConfig {
            client_id: String::new(),
            ..valid_config()
        };
        assert!(config.validate().is_err());

        let config = GatewayConfig {
            webhook_secret: String::new(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn plain_http_base_url_is_rejected() {
        let config = GatewayConfig {
            api_base_url: "http://sandbox.cashfree.com/pg".to_string(),
            ..valid_config()
        };
        assert!(config.validate().is_err());
    }
}
