//! Network provider interfaces and implementations.

pub mod error;
pub mod provider;
pub mod types;

/// Provider error type.
pub use error::ProviderError;
/// Provider trait and the in-process implementation.
pub use provider::{NetworkProvider, local::LocalNetworkProvider};
/// Resource descriptions shared by providers.
pub use types::{
    DEFAULT_ROUTE_DESTINATION, ResourceCounts, ResourceKind, VpcAttribute, VpcDescription,
};
