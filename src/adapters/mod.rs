//! Adapters - concrete implementations of the ports.

pub mod auth;
pub mod cache;
pub mod cashfree;
pub mod catalog;
pub mod coupon;
pub mod esign;
pub mod http;
pub mod storage;
