//! Upstream provider configuration (eSign, identity, coupon service)

use serde::Deserialize;

use super::error::ValidationError;

/// eSign/consent provider configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EsignConfig {
    /// API key for the signing provider
    pub api_key: String,

    /// Base URL for the signing provider API
    pub api_base_url: String,
}

impl EsignConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("ESIGN_API_KEY"));
        }
        if !self.api_base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBaseUrl("esign"));
        }
        Ok(())
    }
}

/// Identity provider configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityConfig {
    /// Base URL for the identity service API
    pub api_base_url: String,
}

impl IdentityConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_base_url.is_empty() {
            return Err(ValidationError::MissingRequired("IDENTITY_API_BASE_URL"));
        }
        if !self.api_base_url.starts_with("http") {
            return Err(ValidationError::InvalidBaseUrl("identity"));
        }
        Ok(())
    }
}

/// Coupon service configuration
///
/// Optional: without a base URL the service runs with an empty registry
/// and every coupon lookup reports not found.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CouponConfig {
    /// Base URL for the coupon service API
    #[serde(default)]
    pub api_base_url: Option<String>,
}

impl CouponConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = &self.api_base_url {
            if !url.starts_with("http") {
                return Err(ValidationError::InvalidBaseUrl("coupon"));
            }
        }
        Ok(())
    }
}

/// Plan catalog configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    /// Path to a JSON file with the purchasable bundles
    #[serde(default)]
    pub bundles_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn esign_requires_key_and_https() {
        let config = EsignConfig {
            api_key: "key".to_string(),
            api_base_url: "https://esign.example.com".to_string(),
        };
        assert!(config.validate().is_ok());

        let config = EsignConfig {
            api_key: String::new(),
            api_base_url: "https://esign.example.com".to_string(),
        };
        assert!(config.validate().is_err());

        let config = EsignConfig {
            api_key: "key".to_string(),
            api_base_url: "ftp://esign.example.com".to_string(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn identity_requires_base_url() {
        assert!(IdentityConfig::default().validate().is_err());

        let config = IdentityConfig {
            api_base_url: "https://id.example.com".to_string(),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn coupon_service_is_optional() {
        assert!(CouponConfig::default().validate().is_ok());

        let config = CouponConfig {
            api_base_url: Some("not-a-url".to_string()),
        };
        assert!(config.validate().is_err());
    }
}
