//! Wire types for VPC records, HTTP envelopes, and request bodies.

mod api;
mod record;

pub use api::{ApiError, ApiResponse, CreateNetworkRequest, ErrorCode, NetworkList};
pub use record::{
    DeletionResult, NetworkRecord, NetworkStatus, PUBLIC_ROUTE_TABLE, SubnetKind, SubnetRecord,
    Tag,
};

/// Provider-assigned identifier of a network (VPC).
pub type NetworkId = String;
