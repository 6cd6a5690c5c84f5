//! Provider error types.

use crate::types::ResourceKind;

/// Errors returned by network providers.
///
/// Every variant maps onto a stable provider error code (see [`ProviderError::code`])
/// so callers can branch on the class of failure without string matching.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The referenced resource does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: ResourceKind, id: String },
    /// The account already holds the maximum number of networks.
    #[error("network limit exceeded (max={0})")]
    LimitExceeded(usize),
    /// An address block is malformed, out of range, or conflicts with another.
    #[error("invalid {kind} range: {message}")]
    InvalidRange { kind: ResourceKind, message: String },
    /// The resource still has dependents and cannot be removed.
    #[error("dependency violation: {0}")]
    DependencyViolation(String),
    /// An internet gateway is not attached to the given network.
    #[error("gateway not attached: {0}")]
    NotAttached(String),
    /// A request parameter was rejected.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// The provider refused the request due to rate limiting.
    #[error("request throttled: {0}")]
    Throttled(String),
    /// The caller is not permitted to perform the operation.
    #[error("access denied: {0}")]
    AccessDenied(String),
    /// Transient provider or transport failure.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    /// Persisting provider state failed.
    #[error("provider state error: {0}")]
    State(String),
}

impl ProviderError {
    /// Provider error code in the style of the upstream cloud API.
    pub fn code(&self) -> &'static str {
        match self {
            ProviderError::NotFound { kind, .. } => match kind {
                ResourceKind::Vpc => "InvalidVpcID.NotFound",
                ResourceKind::Subnet => "InvalidSubnetID.NotFound",
                ResourceKind::InternetGateway => "InvalidInternetGatewayID.NotFound",
                ResourceKind::RouteTable => "InvalidRouteTableID.NotFound",
                ResourceKind::RouteTableAssociation => "InvalidAssociationID.NotFound",
            },
            ProviderError::LimitExceeded(_) => "VpcLimitExceeded",
            ProviderError::InvalidRange { kind, .. } => match kind {
                ResourceKind::Subnet => "InvalidSubnet.Range",
                _ => "InvalidVpc.Range",
            },
            ProviderError::DependencyViolation(_) => "DependencyViolation",
            ProviderError::NotAttached(_) => "Gateway.NotAttached",
            ProviderError::InvalidParameter(_) => "InvalidParameterValue",
            ProviderError::Throttled(_) => "RequestLimitExceeded",
            ProviderError::AccessDenied(_) => "UnauthorizedOperation",
            ProviderError::Unavailable(_) => "ServiceUnavailable",
            ProviderError::State(_) => "InternalError",
        }
    }

    /// Whether the error reports a missing resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }

    /// Whether the error means the caller sent something the provider will
    /// never accept, as opposed to a provider-side fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ProviderError::LimitExceeded(_)
                | ProviderError::InvalidRange { .. }
                | ProviderError::DependencyViolation(_)
        )
    }
}
