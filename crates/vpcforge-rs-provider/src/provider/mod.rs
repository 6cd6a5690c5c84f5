//! Network provider trait.

use async_trait::async_trait;
use vpcforge_rs_protocol::Tag;

use crate::error::ProviderError;
use crate::types::{VpcAttribute, VpcDescription};

pub mod local;

/// Client for the cloud provider's network-resource API.
///
/// Every call either returns the provider-assigned identifier of what it
/// created or a [`ProviderError`]. Implementations are shared across requests
/// behind an `Arc` and must not hold per-request state.
#[async_trait]
pub trait NetworkProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Region all resources are created in.
    fn region(&self) -> &str;

    /// Zones currently reported as available, in provider order.
    async fn available_zones(&self) -> Result<Vec<String>, ProviderError>;

    /// Create a network for the address block and return its id.
    async fn create_vpc(&self, cidr_block: &str) -> Result<String, ProviderError>;

    /// Toggle a boolean network attribute.
    async fn modify_vpc_attribute(
        &self,
        vpc_id: &str,
        attribute: VpcAttribute,
        enabled: bool,
    ) -> Result<(), ProviderError>;

    /// Describe a network.
    async fn describe_vpc(&self, vpc_id: &str) -> Result<VpcDescription, ProviderError>;

    /// Delete a network; fails while dependents exist.
    async fn delete_vpc(&self, vpc_id: &str) -> Result<(), ProviderError>;

    /// Create a subnet inside a network and return its id.
    async fn create_subnet(
        &self,
        vpc_id: &str,
        cidr_block: &str,
        availability_zone: &str,
    ) -> Result<String, ProviderError>;

    /// Toggle public address assignment on launch for a subnet.
    async fn set_map_public_ip_on_launch(
        &self,
        subnet_id: &str,
        enabled: bool,
    ) -> Result<(), ProviderError>;

    /// Delete a subnet; fails while a route table is associated.
    async fn delete_subnet(&self, subnet_id: &str) -> Result<(), ProviderError>;

    /// Create a detached internet gateway and return its id.
    async fn create_internet_gateway(&self) -> Result<String, ProviderError>;

    /// Attach a gateway to a network.
    async fn attach_internet_gateway(
        &self,
        gateway_id: &str,
        vpc_id: &str,
    ) -> Result<(), ProviderError>;

    /// Detach a gateway from a network.
    async fn detach_internet_gateway(
        &self,
        gateway_id: &str,
        vpc_id: &str,
    ) -> Result<(), ProviderError>;

    /// Delete a detached gateway.
    async fn delete_internet_gateway(&self, gateway_id: &str) -> Result<(), ProviderError>;

    /// Create a route table in a network and return its id.
    async fn create_route_table(&self, vpc_id: &str) -> Result<String, ProviderError>;

    /// Add a route sending `destination` to a gateway.
    async fn create_route(
        &self,
        route_table_id: &str,
        destination: &str,
        gateway_id: &str,
    ) -> Result<(), ProviderError>;

    /// Associate a route table with a subnet and return the association id.
    async fn associate_route_table(
        &self,
        route_table_id: &str,
        subnet_id: &str,
    ) -> Result<String, ProviderError>;

    /// Association ids currently held by a route table.
    async fn route_table_associations(
        &self,
        route_table_id: &str,
    ) -> Result<Vec<String>, ProviderError>;

    /// Remove a route table association.
    async fn disassociate_route_table(&self, association_id: &str) -> Result<(), ProviderError>;

    /// Delete a route table; fails while associations remain.
    async fn delete_route_table(&self, route_table_id: &str) -> Result<(), ProviderError>;

    /// Apply tags to every listed resource.
    async fn create_tags(&self, resource_ids: &[String], tags: &[Tag])
    -> Result<(), ProviderError>;
}
