//! HTTP adapters - Axum routes, handlers and DTOs.

pub mod checkout;

pub use checkout::{checkout_router, CheckoutAppState};
