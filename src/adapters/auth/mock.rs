//! Mock identity provider for tests and local development.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use secrecy::ExposeSecret;

use crate::domain::foundation::UserId;
use crate::ports::{AuthError, AuthenticatedIdentity, Credentials, IdentityProvider, Registration};

/// In-memory identity provider. Accounts registered through it can log
/// in afterwards; tokens are simple `token:{user_id}` strings.
pub struct MockIdentityProvider {
    accounts: Mutex<HashMap<String, (String, String)>>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
        }
    }

    /// Seed an account (email, password, user id).
    pub fn with_account(self, email: &str, password: &str, user_id: &str) -> Self {
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            (password.to_string(), user_id.to_string()),
        );
        self
    }

    fn identity(user_id: &str, email: &str) -> Result<AuthenticatedIdentity, AuthError> {
        Ok(AuthenticatedIdentity {
            user_id: UserId::new(user_id).map_err(|e| AuthError::Unavailable(e.to_string()))?,
            email: email.to_string(),
            access_token: format!("token:{}", user_id),
            expires_in: 3600,
        })
    }
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn login(&self, credentials: Credentials) -> Result<AuthenticatedIdentity, AuthError> {
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(&credentials.email) {
            Some((password, user_id)) if password == credentials.password.expose_secret() => {
                Self::identity(user_id, &credentials.email)
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn register(
        &self,
        registration: Registration,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(&registration.email) {
            return Err(AuthError::AccountExists(registration.email));
        }
        let user_id = format!("user_{}", accounts.len() + 1);
        accounts.insert(
            registration.email.clone(),
            (
                registration.password.expose_secret().to_string(),
                user_id.clone(),
            ),
        );
        Self::identity(&user_id, &registration.email)
    }

    async fn validate_token(&self, token: &str) -> Result<UserId, AuthError> {
        token
            .strip_prefix("token:")
            .and_then(|id| UserId::new(id).ok())
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[tokio::test]
    async fn seeded_account_can_log_in() {
        let provider = MockIdentityProvider::new().with_account("a@b.test", "pw", "u1");

        let identity = provider
            .login(Credentials {
                email: "a@b.test".to_string(),
                password: SecretString::new("pw".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(identity.user_id.as_str(), "u1");
        assert_eq!(
            provider
                .validate_token(&identity.access_token)
                .await
                .unwrap()
                .as_str(),
            "u1"
        );
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let provider = MockIdentityProvider::new().with_account("a@b.test", "pw", "u1");

        let result = provider
            .login(Credentials {
                email: "a@b.test".to_string(),
                password: SecretString::new("nope".to_string()),
            })
            .await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let provider = MockIdentityProvider::new().with_account("a@b.test", "pw", "u1");

        let result = provider
            .register(Registration {
                email: "a@b.test".to_string(),
                name: "A".to_string(),
                phone: None,
                password: SecretString::new("pw2".to_string()),
            })
            .await;

        assert!(matches!(result, Err(AuthError::AccountExists(_))));
    }
}
