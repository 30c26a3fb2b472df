//! Route definitions for checkout endpoints.

use axum::routing::{delete, get, post};
use axum::Router;

use super::handlers::{
    apply_coupon, authenticate, cancel_checkout, confirm_consent, create_consent, gateway_return,
    get_checkout, handle_gateway_webhook, launch_checkout, list_bundles, place_order,
    start_checkout, verify_checkout, CheckoutAppState,
};

/// Routes for the plan catalog.
///
/// - `GET /` - List purchasable bundles with per-cycle pricing
pub fn bundle_routes() -> Router<CheckoutAppState> {
    Router::new().route("/", get(list_bundles))
}

/// Routes for the checkout flow.
///
/// - `POST /` - Start a checkout for a chosen bundle and cycle
/// - `GET /:id` - Get the current flow state
/// - `DELETE /:id` - Cancel the current attempt
/// - `POST /:id/auth` - Confirm an identity at the auth gate
/// - `POST /:id/consent` - Create the e-mandate consent document
/// - `POST /:id/consent/confirm` - Check signing status and advance
/// - `POST /:id/order` - Create the gateway order/subscription
/// - `POST /:id/launch` - Re-read the persisted checkout handoff
/// - `GET /:id/return` - Land the user back from the gateway
/// - `POST /:id/verify` - Verify activation with the gateway
/// - `POST /:id/coupon` - Apply a coupon code
pub fn checkout_routes() -> Router<CheckoutAppState> {
    Router::new()
        .route("/", post(start_checkout))
        .route("/:id", get(get_checkout))
        .route("/:id", delete(cancel_checkout))
        .route("/:id/auth", post(authenticate))
        .route("/:id/consent", post(create_consent))
        .route("/:id/consent/confirm", post(confirm_consent))
        .route("/:id/order", post(place_order))
        .route("/:id/launch", post(launch_checkout))
        .route("/:id/return", get(gateway_return))
        .route("/:id/verify", post(verify_checkout))
        .route("/:id/coupon", post(apply_coupon))
}

/// Routes for webhook endpoints (no user authentication; requests are
/// verified by signature instead).
///
/// - `POST /gateway` - Handle payment gateway webhook events
pub fn webhook_routes() -> Router<CheckoutAppState> {
    Router::new().route("/gateway", post(handle_gateway_webhook))
}

/// Combined router for all checkout-related endpoints.
pub fn checkout_router() -> Router<CheckoutAppState> {
    Router::new()
        .nest("/api/bundles", bundle_routes())
        .nest("/api/checkout", checkout_routes())
        .nest("/api/webhooks", webhook_routes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockIdentityProvider;
    use crate::adapters::cache::InMemoryEntitlementCache;
    use crate::adapters::cashfree::MockGateway;
    use crate::adapters::catalog::StaticBundleCatalog;
    use crate::adapters::coupon::StaticCouponRegistry;
    use crate::adapters::esign::MockEsignProvider;
    use crate::adapters::storage::InMemoryFlowStore;
    use std::sync::Arc;

    fn test_state() -> CheckoutAppState {
        CheckoutAppState {
            flow_store: Arc::new(InMemoryFlowStore::new(2700)),
            gateway: Arc::new(MockGateway::new()),
            esign: Arc::new(MockEsignProvider::new()),
            identity: Arc::new(MockIdentityProvider::new()),
            coupons: Arc::new(StaticCouponRegistry::new()),
            catalog: Arc::new(StaticBundleCatalog::new()),
            entitlements: Arc::new(InMemoryEntitlementCache::new(300)),
        }
    }

    #[test]
    fn checkout_routes_build() {
        let router = checkout_routes();
        let _: Router<()> = router.with_state(test_state());
    }

    #[test]
    fn webhook_routes_build() {
        let router = webhook_routes();
        let _: Router<()> = router.with_state(test_state());
    }

    #[test]
    fn combined_router_builds() {
        let router = checkout_router();
        let _: Router<()> = router.with_state(test_state());
    }
}
