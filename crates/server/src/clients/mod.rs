//! HTTP clients for the hosted data store and its identity API.

mod identity_client;
mod remote;
mod store_client;

pub use identity_client::{AuthSession, IdentityApi, IdentityClient};
pub use remote::RemoteHttp;
pub use store_client::{StoreClient, StoreQuery};

#[cfg(any(test, feature = "test-utils"))]
pub use identity_client::MockIdentityApi;
