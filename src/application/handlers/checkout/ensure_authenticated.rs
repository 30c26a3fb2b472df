//! EnsureAuthenticatedHandler - the checkout auth gate.
//!
//! The flow pauses at plan selection until an identity is confirmed,
//! either by logging in, registering inline, or resuming with an already
//! validated bearer token.

use std::sync::Arc;

use crate::domain::checkout::{FlowState, FlowStep, StepKind};
use crate::domain::foundation::{CheckoutId, DomainError, ErrorCode, UserId};
use crate::ports::{
    AuthenticatedIdentity, Credentials, EntitlementCache, FlowStateStore, IdentityProvider,
    Registration,
};

use super::store_error;

/// How the user proves their identity at the gate.
#[derive(Debug, Clone)]
pub enum AuthAction {
    /// Returning user with email and password.
    Login(Credentials),
    /// New user registering mid-checkout.
    Register(Registration),
    /// Already signed in; the bearer token was validated upstream.
    Resume { user_id: UserId },
}

/// Command to confirm an identity for a checkout.
#[derive(Debug, Clone)]
pub struct EnsureAuthenticatedCommand {
    pub checkout_id: CheckoutId,
    pub action: AuthAction,
}

/// Result of the auth gate.
#[derive(Debug, Clone)]
pub struct EnsureAuthenticatedResult {
    pub flow: FlowState,
    /// Fresh session, present for login/register. `None` when resuming.
    pub identity: Option<AuthenticatedIdentity>,
}

/// Confirms an identity, binds it to the flow, and advances past the gate.
///
/// A failed login leaves the flow untouched so the user retries in place.
/// The user's entitlement snapshot is invalidated on a fresh sign-in: it
/// may predate this session.
pub struct EnsureAuthenticatedHandler {
    flow_store: Arc<dyn FlowStateStore>,
    identity_provider: Arc<dyn IdentityProvider>,
    entitlement_cache: Arc<dyn EntitlementCache>,
}

impl EnsureAuthenticatedHandler {
    pub fn new(
        flow_store: Arc<dyn FlowStateStore>,
        identity_provider: Arc<dyn IdentityProvider>,
        entitlement_cache: Arc<dyn EntitlementCache>,
    ) -> Self {
        Self {
            flow_store,
            identity_provider,
            entitlement_cache,
        }
    }

    pub async fn handle(
        &self,
        cmd: EnsureAuthenticatedCommand,
    ) -> Result<EnsureAuthenticatedResult, DomainError> {
        let mut flow = self
            .flow_store
            .load(cmd.checkout_id)
            .await
            .map_err(store_error)?;

        let (user_id, identity) = match cmd.action {
            AuthAction::Login(credentials) => {
                let identity = self.identity_provider.login(credentials).await?;
                (identity.user_id.clone(), Some(identity))
            }
            AuthAction::Register(registration) => {
                let identity = self.identity_provider.register(registration).await?;
                (identity.user_id.clone(), Some(identity))
            }
            AuthAction::Resume { user_id } => (user_id, None),
        };

        // A snapshot cached before this sign-in may be for a stale or
        // anonymous session.
        if identity.is_some() {
            if let Err(e) = self.entitlement_cache.invalidate(&user_id).await {
                tracing::warn!(error = %e, user_id = %user_id, "Entitlement cache invalidation failed on sign-in");
            }
        }

        if flow.step.kind() == StepKind::Plan {
            flow.user_id = Some(user_id);
            flow.advance(FlowStep::Auth)?;
            self.flow_store.save(&flow).await.map_err(store_error)?;
        } else if flow.user_id.as_ref() != Some(&user_id) {
            // A flow in progress belongs to the identity that started it.
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "This checkout was started by a different account",
            ));
        }

        Ok(EnsureAuthenticatedResult { flow, identity })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockIdentityProvider;
    use crate::adapters::cache::InMemoryEntitlementCache;
    use crate::adapters::storage::InMemoryFlowStore;
    use crate::domain::foundation::BundleId;
    use crate::domain::plan::{BillingCycle, Bundle, CyclePricing, PlanSelection};
    use crate::ports::CachedEntitlement;
    use secrecy::SecretString;

    fn seeded_flow() -> FlowState {
        let bundle = Bundle::new(
            BundleId::new("premium").unwrap(),
            "Premium",
            CyclePricing {
                monthly: Some(99_900),
                ..Default::default()
            },
        );
        FlowState::new(PlanSelection::select(&bundle, BillingCycle::Monthly))
    }

    fn login_cmd(checkout_id: CheckoutId) -> EnsureAuthenticatedCommand {
        EnsureAuthenticatedCommand {
            checkout_id,
            action: AuthAction::Login(Credentials {
                email: "user@example.com".to_string(),
                password: SecretString::new("hunter2".to_string()),
            }),
        }
    }

    #[tokio::test]
    async fn login_binds_user_and_advances_past_gate() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let flow = seeded_flow();
        store.save(&flow).await.unwrap();

        let provider =
            Arc::new(MockIdentityProvider::new().with_account("user@example.com", "hunter2", "u1"));
        let cache = Arc::new(InMemoryEntitlementCache::new(300));
        let handler = EnsureAuthenticatedHandler::new(store.clone(), provider, cache);

        let result = handler.handle(login_cmd(flow.id)).await.unwrap();

        assert_eq!(result.flow.step.kind(), StepKind::Auth);
        assert_eq!(result.flow.user_id.as_ref().unwrap().as_str(), "u1");
        assert!(result.identity.is_some());

        let stored = store.load(flow.id).await.unwrap();
        assert_eq!(stored.step.kind(), StepKind::Auth);
    }

    #[tokio::test]
    async fn failed_login_leaves_flow_at_plan() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let flow = seeded_flow();
        store.save(&flow).await.unwrap();

        let provider =
            Arc::new(MockIdentityProvider::new().with_account("user@example.com", "correct", "u1"));
        let cache = Arc::new(InMemoryEntitlementCache::new(300));
        let handler = EnsureAuthenticatedHandler::new(store.clone(), provider, cache);

        let err = handler.handle(login_cmd(flow.id)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);
        assert!(err.code.is_recoverable());

        let stored = store.load(flow.id).await.unwrap();
        assert_eq!(stored.step.kind(), StepKind::Plan);
        assert!(stored.user_id.is_none());
    }

    #[tokio::test]
    async fn login_invalidates_stale_entitlement_snapshot() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let flow = seeded_flow();
        store.save(&flow).await.unwrap();

        let user_id = UserId::new("u1").unwrap();
        let cache = Arc::new(InMemoryEntitlementCache::new(300));
        cache
            .put(&CachedEntitlement {
                user_id: user_id.clone(),
                active_bundles: vec![BundleId::new("old-bundle").unwrap()],
                fetched_at: 1_700_000_000,
            })
            .await
            .unwrap();

        let provider =
            Arc::new(MockIdentityProvider::new().with_account("user@example.com", "hunter2", "u1"));
        let handler = EnsureAuthenticatedHandler::new(store, provider, cache.clone());

        handler.handle(login_cmd(flow.id)).await.unwrap();

        assert_eq!(cache.get(&user_id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn resume_with_matching_user_is_idempotent() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let mut flow = seeded_flow();
        flow.user_id = Some(UserId::new("u1").unwrap());
        flow.advance(FlowStep::Auth).unwrap();
        store.save(&flow).await.unwrap();

        let handler = EnsureAuthenticatedHandler::new(
            store,
            Arc::new(MockIdentityProvider::new()),
            Arc::new(InMemoryEntitlementCache::new(300)),
        );

        let result = handler
            .handle(EnsureAuthenticatedCommand {
                checkout_id: flow.id,
                action: AuthAction::Resume {
                    user_id: UserId::new("u1").unwrap(),
                },
            })
            .await
            .unwrap();

        assert_eq!(result.flow.step.kind(), StepKind::Auth);
        assert!(result.identity.is_none());
    }

    #[tokio::test]
    async fn different_account_cannot_take_over_a_flow() {
        let store = Arc::new(InMemoryFlowStore::new(2700));
        let mut flow = seeded_flow();
        flow.user_id = Some(UserId::new("u1").unwrap());
        flow.advance(FlowStep::Auth).unwrap();
        store.save(&flow).await.unwrap();

        let handler = EnsureAuthenticatedHandler::new(
            store,
            Arc::new(MockIdentityProvider::new()),
            Arc::new(InMemoryEntitlementCache::new(300)),
        );

        let err = handler
            .handle(EnsureAuthenticatedCommand {
                checkout_id: flow.id,
                action: AuthAction::Resume {
                    user_id: UserId::new("intruder").unwrap(),
                },
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn missing_flow_reports_flow_not_found() {
        let handler = EnsureAuthenticatedHandler::new(
            Arc::new(InMemoryFlowStore::new(2700)),
            Arc::new(MockIdentityProvider::new()),
            Arc::new(InMemoryEntitlementCache::new(300)),
        );

        let err = handler.handle(login_cmd(CheckoutId::new())).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::FlowNotFound);
    }
}
