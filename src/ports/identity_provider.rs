//! Identity provider port - the checkout auth gate.
//!
//! The flow pauses at the auth step until an identity is confirmed. The
//! provider handles both login for returning users and inline
//! registration for new ones, and validates bearer tokens on
//! authenticated requests.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode, UserId};

/// Login credentials for a returning user.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// Registration details for a new user signing up mid-checkout.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub password: SecretString,
}

/// A confirmed identity with its session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedIdentity {
    pub user_id: UserId,
    pub email: String,
    /// Bearer token for subsequent requests.
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

/// Errors from the identity provider.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Wrong email/password. Recoverable: the user retries in place.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account already exists for {0}")]
    AccountExists(String),

    #[error("Token invalid or expired")]
    InvalidToken,

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        let code = match err {
            AuthError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AuthError::AccountExists(_) => ErrorCode::ValidationFailed,
            AuthError::InvalidToken => ErrorCode::AuthenticationRequired,
            AuthError::Unavailable(_) => ErrorCode::ExternalServiceError,
        };
        DomainError::new(code, err.to_string())
    }
}

/// Port for identity management.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authenticate a returning user.
    async fn login(&self, credentials: Credentials)
        -> Result<AuthenticatedIdentity, AuthError>;

    /// Register a new user and sign them in.
    async fn register(
        &self,
        registration: Registration,
    ) -> Result<AuthenticatedIdentity, AuthError>;

    /// Validate a bearer token and resolve the user it belongs to.
    async fn validate_token(&self, token: &str) -> Result<UserId, AuthError>;
}
