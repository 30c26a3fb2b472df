//! HTTP adapter for checkout endpoints.
//!
//! Exposes the checkout flow via REST API:
//! - `GET /api/bundles` - List purchasable bundles
//! - `POST /api/checkout` - Start a checkout
//! - `GET /api/checkout/:id` - Get the current flow state
//! - `DELETE /api/checkout/:id` - Cancel the current attempt
//! - `POST /api/checkout/:id/auth` - Confirm an identity at the auth gate
//! - `POST /api/checkout/:id/consent` - Create the e-mandate consent document
//! - `POST /api/checkout/:id/consent/confirm` - Check signing status and advance
//! - `POST /api/checkout/:id/order` - Create the gateway order/subscription
//! - `POST /api/checkout/:id/launch` - Re-read the persisted checkout handoff
//! - `GET /api/checkout/:id/return` - Land the user back from the gateway
//! - `POST /api/checkout/:id/verify` - Verify activation with the gateway
//! - `POST /api/checkout/:id/coupon` - Apply a coupon code
//! - `POST /api/webhooks/gateway` - Handle payment gateway webhooks

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::{ApiError, AuthenticatedUser, CheckoutAppState};
pub use routes::{bundle_routes, checkout_router, checkout_routes, webhook_routes};
