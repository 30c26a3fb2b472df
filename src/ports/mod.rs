//! Ports - contracts between the application core and the outside world.
//!
//! Each port is an async trait owned by the core; adapters implement them.
//! Handlers depend only on these traits, never on concrete adapters.

pub mod bundle_catalog;
pub mod coupon_registry;
pub mod entitlement_cache;
pub mod esign_provider;
pub mod flow_store;
pub mod identity_provider;
pub mod payment_gateway;

pub use bundle_catalog::{BundleCatalog, CatalogError};
pub use coupon_registry::{CouponRegistry, CouponLookupError};
pub use entitlement_cache::{CachedEntitlement, EntitlementCache, EntitlementCacheError};
pub use esign_provider::{ConsentRequest, EsignError, EsignProvider};
pub use flow_store::{FlowStateStore, FlowStoreError};
pub use identity_provider::{AuthError, AuthenticatedIdentity, Credentials, IdentityProvider, Registration};
pub use payment_gateway::{
    CreateMandateRequest, CreateOrderRequest, GatewayError, GatewayErrorCode, GatewaySession,
    GatewayStatus, PaymentGateway, WebhookEvent,
};
