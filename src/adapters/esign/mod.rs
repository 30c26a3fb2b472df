//! eSign provider adapters.

mod client;
mod mock;

pub use client::{EsignClient, EsignClientConfig};
pub use mock::MockEsignProvider;
