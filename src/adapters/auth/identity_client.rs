//! HTTP adapter for the identity service.
//!
//! Wraps the identity service's REST API for login, inline registration,
//! and bearer token validation.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;

use crate::domain::foundation::UserId;
use crate::ports::{AuthError, AuthenticatedIdentity, Credentials, IdentityProvider, Registration};

/// Identity service configuration.
#[derive(Clone)]
pub struct IdentityClientConfig {
    api_base_url: String,
}

impl IdentityClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
        }
    }
}

/// REST client for the identity service.
pub struct IdentityClient {
    config: IdentityClientConfig,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    user_id: String,
    email: String,
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct IntrospectResponse {
    active: bool,
    user_id: Option<String>,
}

impl IdentityClient {
    pub fn new(config: IdentityClientConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn identity_from(token: TokenResponse) -> Result<AuthenticatedIdentity, AuthError> {
        let user_id =
            UserId::new(&token.user_id).map_err(|e| AuthError::Unavailable(e.to_string()))?;
        Ok(AuthenticatedIdentity {
            user_id,
            email: token.email,
            access_token: token.access_token,
            expires_in: token.expires_in,
        })
    }
}

#[async_trait]
impl IdentityProvider for IdentityClient {
    async fn login(&self, credentials: Credentials) -> Result<AuthenticatedIdentity, AuthError> {
        let url = format!("{}/auth/login", self.config.api_base_url);

        let response = self
            .http_client
            .post(&url)
            .json(&json!({
                "email": credentials.email,
                "password": credentials.password.expose_secret(),
            }))
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        match response.status() {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                return Err(AuthError::InvalidCredentials)
            }
            status if !status.is_success() => {
                let text = response.text().await.unwrap_or_default();
                tracing::error!(status = %status, error = %text, "Identity login failed");
                return Err(AuthError::Unavailable(text));
            }
            _ => {}
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Unavailable(format!("Unparseable response: {}", e)))?;

        Self::identity_from(token)
    }

    async fn register(
        &self,
        registration: Registration,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        let url = format!("{}/auth/register", self.config.api_base_url);

        let response = self
            .http_client
            .post(&url)
            .json(&json!({
                "email": registration.email,
                "name": registration.name,
                "phone": registration.phone,
                "password": registration.password.expose_secret(),
            }))
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::CONFLICT {
            return Err(AuthError::AccountExists(registration.email));
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %text, "Identity register failed");
            return Err(AuthError::Unavailable(text));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Unavailable(format!("Unparseable response: {}", e)))?;

        Self::identity_from(token)
    }

    async fn validate_token(&self, token: &str) -> Result<UserId, AuthError> {
        let url = format!("{}/auth/introspect", self.config.api_base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidToken);
        }

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AuthError::Unavailable(text));
        }

        let introspect: IntrospectResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Unavailable(format!("Unparseable response: {}", e)))?;

        if !introspect.active {
            return Err(AuthError::InvalidToken);
        }

        introspect
            .user_id
            .as_deref()
            .and_then(|id| UserId::new(id).ok())
            .ok_or(AuthError::InvalidToken)
    }
}
