//! Identity provider adapters.

mod identity_client;
mod mock;

pub use identity_client::{IdentityClient, IdentityClientConfig};
pub use mock::MockIdentityProvider;
