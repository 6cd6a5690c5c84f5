//! Persisted network metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::NetworkId;

/// Route table role for the table serving the public subnet.
pub const PUBLIC_ROUTE_TABLE: &str = "public";

/// Reachability class of a subnet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SubnetKind {
    /// Routed to the internet gateway.
    Public,
    /// No route to the internet gateway.
    Private,
}

impl SubnetKind {
    /// Lowercase label used in tags and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            SubnetKind::Public => "public",
            SubnetKind::Private => "private",
        }
    }
}

impl fmt::Display for SubnetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a stored network record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NetworkStatus {
    /// Every resource of the creation plan exists.
    Available,
    /// Teardown started and has not yet completed.
    Deleting,
    /// Teardown completed.
    Deleted,
}

impl fmt::Display for NetworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NetworkStatus::Available => "available",
            NetworkStatus::Deleting => "deleting",
            NetworkStatus::Deleted => "deleted",
        };
        f.write_str(label)
    }
}

/// One subnet created for a network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubnetRecord {
    pub subnet_id: String,
    pub cidr_block: String,
    pub availability_zone: String,
    #[serde(rename = "type")]
    pub kind: SubnetKind,
}

/// Metadata describing one provisioned network and everything created with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkRecord {
    /// Provider-assigned network id; primary key of the metadata table.
    pub vpc_id: NetworkId,
    /// User-supplied label.
    pub name: String,
    /// Address range of the network.
    pub cidr_block: String,
    /// Region the network lives in.
    pub region: String,
    /// Public subnet first, then private.
    pub subnets: Vec<SubnetRecord>,
    /// Attached internet gateway.
    #[serde(default)]
    pub internet_gateway_id: Option<String>,
    /// Route table ids keyed by role.
    #[serde(default)]
    pub route_tables: BTreeMap<String, String>,
    pub status: NetworkStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Marker of the system that created the record.
    pub created_by: String,
}

impl NetworkRecord {
    /// Subnet of the given kind, if present.
    pub fn subnet(&self, kind: SubnetKind) -> Option<&SubnetRecord> {
        self.subnets.iter().find(|subnet| subnet.kind == kind)
    }

    /// Route table serving the public subnet.
    pub fn public_route_table(&self) -> Option<&str> {
        self.route_tables
            .get(PUBLIC_ROUTE_TABLE)
            .map(String::as_str)
    }

    /// Whether the record is visible as a usable network.
    pub fn is_available(&self) -> bool {
        self.status == NetworkStatus::Available
    }
}

/// Outcome of a completed teardown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletionResult {
    pub vpc_id: NetworkId,
    pub status: NetworkStatus,
    pub deleted_at: DateTime<Utc>,
    /// Set when the provider no longer knew the network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Key/value tag applied to provider resources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_record() -> NetworkRecord {
        NetworkRecord {
            vpc_id: "vpc-0a1b2c3d4e5f60718".to_string(),
            name: "test-vpc-1".to_string(),
            cidr_block: "10.0.0.0/16".to_string(),
            region: "us-east-2".to_string(),
            subnets: vec![
                SubnetRecord {
                    subnet_id: "subnet-01".to_string(),
                    cidr_block: "10.0.1.0/24".to_string(),
                    availability_zone: "us-east-2a".to_string(),
                    kind: SubnetKind::Public,
                },
                SubnetRecord {
                    subnet_id: "subnet-02".to_string(),
                    cidr_block: "10.0.2.0/24".to_string(),
                    availability_zone: "us-east-2a".to_string(),
                    kind: SubnetKind::Private,
                },
            ],
            internet_gateway_id: Some("igw-01".to_string()),
            route_tables: BTreeMap::from([(PUBLIC_ROUTE_TABLE.to_string(), "rtb-01".to_string())]),
            status: NetworkStatus::Available,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            deleted_at: None,
            created_by: "vpc-api".to_string(),
        }
    }

    #[test]
    fn record_uses_api_field_names() {
        let value = serde_json::to_value(sample_record()).expect("serialize");
        assert_eq!(value["vpc_id"], json!("vpc-0a1b2c3d4e5f60718"));
        assert_eq!(value["subnets"][0]["type"], json!("public"));
        assert_eq!(value["subnets"][1]["subnet_id"], json!("subnet-02"));
        assert_eq!(value["route_tables"]["public"], json!("rtb-01"));
        assert_eq!(value["status"], json!("available"));
        assert!(value.get("deleted_at").is_none());
    }

    #[test]
    fn record_lookups() {
        let record = sample_record();
        assert_eq!(
            record.subnet(SubnetKind::Private).map(|s| s.cidr_block.as_str()),
            Some("10.0.2.0/24")
        );
        assert_eq!(record.public_route_table(), Some("rtb-01"));
        assert!(record.is_available());
    }
}
