//! Resource kinds and descriptions returned by providers.

use serde::{Deserialize, Serialize};
use std::fmt;
use vpcforge_rs_protocol::Tag;

/// Destination of the default route.
pub const DEFAULT_ROUTE_DESTINATION: &str = "0.0.0.0/0";

/// Kind of provider resource, used in errors and cleanup reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Vpc,
    Subnet,
    InternetGateway,
    RouteTable,
    RouteTableAssociation,
}

impl ResourceKind {
    /// Infer the kind from a provider id prefix.
    pub fn from_id(id: &str) -> Option<Self> {
        let (prefix, _) = id.split_once('-')?;
        match prefix {
            "vpc" => Some(ResourceKind::Vpc),
            "subnet" => Some(ResourceKind::Subnet),
            "igw" => Some(ResourceKind::InternetGateway),
            "rtb" => Some(ResourceKind::RouteTable),
            "rtbassoc" => Some(ResourceKind::RouteTableAssociation),
            _ => None,
        }
    }

    /// Id prefix used when minting ids of this kind.
    pub fn id_prefix(self) -> &'static str {
        match self {
            ResourceKind::Vpc => "vpc",
            ResourceKind::Subnet => "subnet",
            ResourceKind::InternetGateway => "igw",
            ResourceKind::RouteTable => "rtb",
            ResourceKind::RouteTableAssociation => "rtbassoc",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ResourceKind::Vpc => "vpc",
            ResourceKind::Subnet => "subnet",
            ResourceKind::InternetGateway => "internet gateway",
            ResourceKind::RouteTable => "route table",
            ResourceKind::RouteTableAssociation => "route table association",
        };
        f.write_str(label)
    }
}

/// Provider view of a network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpcDescription {
    pub vpc_id: String,
    pub cidr_block: String,
    pub enable_dns_support: bool,
    pub enable_dns_hostnames: bool,
    pub tags: Vec<Tag>,
}

/// Number of live resources of each kind held by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    pub vpcs: usize,
    pub subnets: usize,
    pub internet_gateways: usize,
    pub route_tables: usize,
    pub associations: usize,
}

impl ResourceCounts {
    /// True when the provider holds nothing at all.
    pub fn is_empty(&self) -> bool {
        *self == ResourceCounts::default()
    }
}

/// Boolean network attributes that can be toggled after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VpcAttribute {
    EnableDnsSupport,
    EnableDnsHostnames,
}

impl fmt::Display for VpcAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VpcAttribute::EnableDnsSupport => f.write_str("enableDnsSupport"),
            VpcAttribute::EnableDnsHostnames => f.write_str("enableDnsHostnames"),
        }
    }
}
