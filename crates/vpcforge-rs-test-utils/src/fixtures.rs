use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use vpcforge_rs_protocol::{
    NetworkRecord, NetworkStatus, PUBLIC_ROUTE_TABLE, SubnetKind, SubnetRecord,
};
use vpcforge_rs_provider::LocalNetworkProvider;

pub const TEST_REGION: &str = "us-east-2";

pub fn test_zones() -> Vec<String> {
    ["us-east-2a", "us-east-2b", "us-east-2c"]
        .iter()
        .map(|zone| zone.to_string())
        .collect()
}

pub fn local_provider() -> LocalNetworkProvider {
    LocalNetworkProvider::new(TEST_REGION, test_zones())
}

/// A fully populated record that was never provisioned anywhere.
pub fn sample_record(vpc_id: &str, name: &str, created_at: DateTime<Utc>) -> NetworkRecord {
    NetworkRecord {
        vpc_id: vpc_id.to_string(),
        name: name.to_string(),
        cidr_block: "10.0.0.0/16".to_string(),
        region: TEST_REGION.to_string(),
        subnets: vec![
            SubnetRecord {
                subnet_id: "subnet-0000000000000001".to_string(),
                cidr_block: "10.0.1.0/24".to_string(),
                availability_zone: "us-east-2a".to_string(),
                kind: SubnetKind::Public,
            },
            SubnetRecord {
                subnet_id: "subnet-0000000000000002".to_string(),
                cidr_block: "10.0.2.0/24".to_string(),
                availability_zone: "us-east-2a".to_string(),
                kind: SubnetKind::Private,
            },
        ],
        internet_gateway_id: Some("igw-0000000000000001".to_string()),
        route_tables: BTreeMap::from([(
            PUBLIC_ROUTE_TABLE.to_string(),
            "rtb-0000000000000001".to_string(),
        )]),
        status: NetworkStatus::Available,
        created_at,
        deleted_at: None,
        created_by: "vpc-api".to_string(),
    }
}
