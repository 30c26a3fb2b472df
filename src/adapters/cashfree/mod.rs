//! Cashfree payment gateway adapter.

mod gateway;
mod mock;
mod types;

pub use gateway::{CashfreeConfig, CashfreeGateway};
pub use mock::MockGateway;
pub use types::{hex_decode, hex_encode};
