//! In-process network provider with cloud-like semantics.
//!
//! The local provider keeps every resource in memory and enforces the same
//! dependency rules as the real network API: a network cannot be deleted while
//! subnets, route tables, or an attached gateway remain; a subnet cannot be
//! deleted while associated; a gateway cannot be deleted while attached. State
//! can optionally be persisted to a JSON file so resources outlive the process.

use async_trait::async_trait;
use ipnetwork::Ipv4Network;
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use vpcforge_rs_config::ProviderConfig;
use vpcforge_rs_protocol::Tag;

use crate::error::ProviderError;
use crate::provider::NetworkProvider;
use crate::types::{ResourceCounts, ResourceKind, VpcAttribute, VpcDescription};

const MIN_PREFIX: u8 = 16;
const MAX_PREFIX: u8 = 28;
const DEFAULT_MAX_NETWORKS: usize = 5;
/// Hex characters in a minted id suffix.
const ID_SUFFIX_LEN: usize = 17;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct VpcEntry {
    cidr_block: String,
    enable_dns_support: bool,
    enable_dns_hostnames: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SubnetEntry {
    vpc_id: String,
    cidr_block: String,
    availability_zone: String,
    map_public_ip_on_launch: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GatewayEntry {
    attached_vpc: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RouteTableEntry {
    vpc_id: String,
    /// Destination block to gateway id.
    routes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AssociationEntry {
    route_table_id: String,
    subnet_id: String,
}

/// Every resource the provider knows about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LocalState {
    vpcs: BTreeMap<String, VpcEntry>,
    subnets: BTreeMap<String, SubnetEntry>,
    gateways: BTreeMap<String, GatewayEntry>,
    route_tables: BTreeMap<String, RouteTableEntry>,
    associations: BTreeMap<String, AssociationEntry>,
    tags: BTreeMap<String, Vec<Tag>>,
}

impl LocalState {
    fn vpc(&self, id: &str) -> Result<&VpcEntry, ProviderError> {
        self.vpcs.get(id).ok_or_else(|| not_found(ResourceKind::Vpc, id))
    }

    fn subnet(&self, id: &str) -> Result<&SubnetEntry, ProviderError> {
        self.subnets
            .get(id)
            .ok_or_else(|| not_found(ResourceKind::Subnet, id))
    }

    fn gateway(&self, id: &str) -> Result<&GatewayEntry, ProviderError> {
        self.gateways
            .get(id)
            .ok_or_else(|| not_found(ResourceKind::InternetGateway, id))
    }

    fn route_table(&self, id: &str) -> Result<&RouteTableEntry, ProviderError> {
        self.route_tables
            .get(id)
            .ok_or_else(|| not_found(ResourceKind::RouteTable, id))
    }

    fn contains(&self, id: &str) -> bool {
        match ResourceKind::from_id(id) {
            Some(ResourceKind::Vpc) => self.vpcs.contains_key(id),
            Some(ResourceKind::Subnet) => self.subnets.contains_key(id),
            Some(ResourceKind::InternetGateway) => self.gateways.contains_key(id),
            Some(ResourceKind::RouteTable) => self.route_tables.contains_key(id),
            Some(ResourceKind::RouteTableAssociation) => self.associations.contains_key(id),
            None => false,
        }
    }

    fn counts(&self) -> ResourceCounts {
        ResourceCounts {
            vpcs: self.vpcs.len(),
            subnets: self.subnets.len(),
            internet_gateways: self.gateways.len(),
            route_tables: self.route_tables.len(),
            associations: self.associations.len(),
        }
    }
}

/// Network provider that emulates the cloud network API in process.
#[derive(Debug)]
pub struct LocalNetworkProvider {
    region: String,
    zones: Vec<String>,
    max_networks: usize,
    state: Mutex<LocalState>,
    /// JSON file mirrored after every mutation, when set.
    state_path: Option<PathBuf>,
}

impl LocalNetworkProvider {
    /// Create an empty provider for a region and its zones.
    pub fn new(region: impl Into<String>, zones: Vec<String>) -> Self {
        Self {
            region: region.into(),
            zones,
            max_networks: DEFAULT_MAX_NETWORKS,
            state: Mutex::new(LocalState::default()),
            state_path: None,
        }
    }

    /// Override the number of networks admitted before `VpcLimitExceeded`.
    pub fn with_max_networks(mut self, max_networks: usize) -> Self {
        self.max_networks = max_networks;
        self
    }

    /// Mirror state to `path`, loading whatever it already holds.
    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Result<Self, ProviderError> {
        let path = path.into();
        let state = load_state(&path)?;
        info!(
            "local provider state loaded (path={}, vpcs={})",
            path.display(),
            state.vpcs.len()
        );
        self.state = Mutex::new(state);
        self.state_path = Some(path);
        Ok(self)
    }

    /// Build a provider from the `provider` config section.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let provider =
            Self::new(config.region.clone(), config.zones()).with_max_networks(config.max_networks);
        match &config.state_path {
            Some(path) => provider.with_state_path(path),
            None => Ok(provider),
        }
    }

    /// Count live resources by kind.
    pub fn resource_counts(&self) -> ResourceCounts {
        self.state.lock().counts()
    }

    /// Tags currently applied to a resource.
    pub fn tags_for(&self, resource_id: &str) -> Vec<Tag> {
        self.state
            .lock()
            .tags
            .get(resource_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether a subnet maps public addresses on launch; `None` if unknown.
    pub fn subnet_maps_public_ip(&self, subnet_id: &str) -> Option<bool> {
        self.state
            .lock()
            .subnets
            .get(subnet_id)
            .map(|subnet| subnet.map_public_ip_on_launch)
    }

    /// Gateway a route table sends `destination` to, if routed.
    pub fn route_target(&self, route_table_id: &str, destination: &str) -> Option<String> {
        self.state
            .lock()
            .route_tables
            .get(route_table_id)
            .and_then(|table| table.routes.get(destination).cloned())
    }

    /// Run a mutation under the lock and mirror the result to disk. With a
    /// state file the change only becomes visible once it has been written.
    fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut LocalState) -> Result<T, ProviderError>,
    ) -> Result<T, ProviderError> {
        let mut state = self.state.lock();
        let Some(path) = &self.state_path else {
            return apply(&mut state);
        };
        let mut next = state.clone();
        let value = apply(&mut next)?;
        persist_state(path, &next)?;
        *state = next;
        Ok(value)
    }

    fn ensure_zone(&self, zone: &str) -> Result<(), ProviderError> {
        if self.zones.iter().any(|known| known == zone) {
            Ok(())
        } else {
            Err(ProviderError::InvalidParameter(format!(
                "availability zone '{zone}' does not exist in {}",
                self.region
            )))
        }
    }
}

#[async_trait]
impl NetworkProvider for LocalNetworkProvider {
    fn name(&self) -> &str {
        "local"
    }

    fn region(&self) -> &str {
        &self.region
    }

    async fn available_zones(&self) -> Result<Vec<String>, ProviderError> {
        Ok(self.zones.clone())
    }

    async fn create_vpc(&self, cidr_block: &str) -> Result<String, ProviderError> {
        let block = parse_block(ResourceKind::Vpc, cidr_block)?;
        self.mutate(|state| {
            if state.vpcs.len() >= self.max_networks {
                return Err(ProviderError::LimitExceeded(self.max_networks));
            }
            let vpc_id = mint_id(ResourceKind::Vpc);
            state.vpcs.insert(
                vpc_id.clone(),
                VpcEntry {
                    cidr_block: block.to_string(),
                    enable_dns_support: true,
                    enable_dns_hostnames: false,
                },
            );
            debug!("local vpc created (vpc_id={vpc_id}, cidr={block})");
            Ok(vpc_id)
        })
    }

    async fn modify_vpc_attribute(
        &self,
        vpc_id: &str,
        attribute: VpcAttribute,
        enabled: bool,
    ) -> Result<(), ProviderError> {
        self.mutate(|state| {
            let vpc = state
                .vpcs
                .get_mut(vpc_id)
                .ok_or_else(|| not_found(ResourceKind::Vpc, vpc_id))?;
            match attribute {
                VpcAttribute::EnableDnsSupport => vpc.enable_dns_support = enabled,
                VpcAttribute::EnableDnsHostnames => vpc.enable_dns_hostnames = enabled,
            }
            Ok(())
        })
    }

    async fn describe_vpc(&self, vpc_id: &str) -> Result<VpcDescription, ProviderError> {
        let state = self.state.lock();
        let vpc = state.vpc(vpc_id)?;
        Ok(VpcDescription {
            vpc_id: vpc_id.to_string(),
            cidr_block: vpc.cidr_block.clone(),
            enable_dns_support: vpc.enable_dns_support,
            enable_dns_hostnames: vpc.enable_dns_hostnames,
            tags: state.tags.get(vpc_id).cloned().unwrap_or_default(),
        })
    }

    async fn delete_vpc(&self, vpc_id: &str) -> Result<(), ProviderError> {
        self.mutate(|state| {
            state.vpc(vpc_id)?;
            let has_subnets = state.subnets.values().any(|s| s.vpc_id == vpc_id);
            let has_tables = state.route_tables.values().any(|t| t.vpc_id == vpc_id);
            let has_gateway = state
                .gateways
                .values()
                .any(|g| g.attached_vpc.as_deref() == Some(vpc_id));
            if has_subnets || has_tables || has_gateway {
                return Err(ProviderError::DependencyViolation(format!(
                    "the vpc '{vpc_id}' has dependencies and cannot be deleted"
                )));
            }
            state.vpcs.remove(vpc_id);
            state.tags.remove(vpc_id);
            debug!("local vpc deleted (vpc_id={vpc_id})");
            Ok(())
        })
    }

    async fn create_subnet(
        &self,
        vpc_id: &str,
        cidr_block: &str,
        availability_zone: &str,
    ) -> Result<String, ProviderError> {
        let block = parse_block(ResourceKind::Subnet, cidr_block)?;
        self.ensure_zone(availability_zone)?;
        self.mutate(|state| {
            let parent = parse_block(ResourceKind::Vpc, &state.vpc(vpc_id)?.cidr_block)?;
            if block.prefix() < parent.prefix() || !parent.contains(block.network()) {
                return Err(ProviderError::InvalidRange {
                    kind: ResourceKind::Subnet,
                    message: format!("the cidr '{block}' is not within the vpc range {parent}"),
                });
            }
            let conflict = state
                .subnets
                .iter()
                .filter(|(_, subnet)| subnet.vpc_id == vpc_id)
                .find(|(_, subnet)| {
                    parse_block(ResourceKind::Subnet, &subnet.cidr_block)
                        .map(|existing| overlaps(existing, block))
                        .unwrap_or(false)
                });
            if let Some((existing_id, _)) = conflict {
                return Err(ProviderError::InvalidRange {
                    kind: ResourceKind::Subnet,
                    message: format!("the cidr '{block}' conflicts with subnet {existing_id}"),
                });
            }
            let subnet_id = mint_id(ResourceKind::Subnet);
            state.subnets.insert(
                subnet_id.clone(),
                SubnetEntry {
                    vpc_id: vpc_id.to_string(),
                    cidr_block: block.to_string(),
                    availability_zone: availability_zone.to_string(),
                    map_public_ip_on_launch: false,
                },
            );
            debug!("local subnet created (vpc_id={vpc_id}, subnet_id={subnet_id}, cidr={block})");
            Ok(subnet_id)
        })
    }

    async fn set_map_public_ip_on_launch(
        &self,
        subnet_id: &str,
        enabled: bool,
    ) -> Result<(), ProviderError> {
        self.mutate(|state| {
            let subnet = state
                .subnets
                .get_mut(subnet_id)
                .ok_or_else(|| not_found(ResourceKind::Subnet, subnet_id))?;
            subnet.map_public_ip_on_launch = enabled;
            Ok(())
        })
    }

    async fn delete_subnet(&self, subnet_id: &str) -> Result<(), ProviderError> {
        self.mutate(|state| {
            state.subnet(subnet_id)?;
            if state
                .associations
                .values()
                .any(|assoc| assoc.subnet_id == subnet_id)
            {
                return Err(ProviderError::DependencyViolation(format!(
                    "the subnet '{subnet_id}' has dependencies and cannot be deleted"
                )));
            }
            state.subnets.remove(subnet_id);
            state.tags.remove(subnet_id);
            debug!("local subnet deleted (subnet_id={subnet_id})");
            Ok(())
        })
    }

    async fn create_internet_gateway(&self) -> Result<String, ProviderError> {
        self.mutate(|state| {
            let gateway_id = mint_id(ResourceKind::InternetGateway);
            state
                .gateways
                .insert(gateway_id.clone(), GatewayEntry::default());
            debug!("local internet gateway created (gateway_id={gateway_id})");
            Ok(gateway_id)
        })
    }

    async fn attach_internet_gateway(
        &self,
        gateway_id: &str,
        vpc_id: &str,
    ) -> Result<(), ProviderError> {
        self.mutate(|state| {
            state.vpc(vpc_id)?;
            if let Some(current) = &state.gateway(gateway_id)?.attached_vpc {
                return Err(ProviderError::InvalidParameter(format!(
                    "gateway {gateway_id} is already attached to {current}"
                )));
            }
            if state
                .gateways
                .values()
                .any(|g| g.attached_vpc.as_deref() == Some(vpc_id))
            {
                return Err(ProviderError::InvalidParameter(format!(
                    "vpc {vpc_id} already has an internet gateway attached"
                )));
            }
            if let Some(gateway) = state.gateways.get_mut(gateway_id) {
                gateway.attached_vpc = Some(vpc_id.to_string());
            }
            debug!("local internet gateway attached (gateway_id={gateway_id}, vpc_id={vpc_id})");
            Ok(())
        })
    }

    async fn detach_internet_gateway(
        &self,
        gateway_id: &str,
        vpc_id: &str,
    ) -> Result<(), ProviderError> {
        self.mutate(|state| {
            let attached = state.gateway(gateway_id)?.attached_vpc.as_deref() == Some(vpc_id);
            if !attached {
                return Err(ProviderError::NotAttached(format!(
                    "gateway {gateway_id} is not attached to {vpc_id}"
                )));
            }
            let routed_tables: Vec<String> = state
                .route_tables
                .iter()
                .filter(|(_, table)| table.routes.values().any(|gw| gw == gateway_id))
                .map(|(id, _)| id.clone())
                .collect();
            for table_id in routed_tables {
                // Routes through a detached gateway become blackholes; drop them.
                if let Some(table) = state.route_tables.get_mut(&table_id) {
                    table.routes.retain(|_, gw| gw != gateway_id);
                }
            }
            if let Some(gateway) = state.gateways.get_mut(gateway_id) {
                gateway.attached_vpc = None;
            }
            debug!("local internet gateway detached (gateway_id={gateway_id}, vpc_id={vpc_id})");
            Ok(())
        })
    }

    async fn delete_internet_gateway(&self, gateway_id: &str) -> Result<(), ProviderError> {
        self.mutate(|state| {
            if let Some(vpc_id) = &state.gateway(gateway_id)?.attached_vpc {
                return Err(ProviderError::DependencyViolation(format!(
                    "the internet gateway '{gateway_id}' is attached to {vpc_id}"
                )));
            }
            state.gateways.remove(gateway_id);
            state.tags.remove(gateway_id);
            debug!("local internet gateway deleted (gateway_id={gateway_id})");
            Ok(())
        })
    }

    async fn create_route_table(&self, vpc_id: &str) -> Result<String, ProviderError> {
        self.mutate(|state| {
            state.vpc(vpc_id)?;
            let route_table_id = mint_id(ResourceKind::RouteTable);
            state.route_tables.insert(
                route_table_id.clone(),
                RouteTableEntry {
                    vpc_id: vpc_id.to_string(),
                    routes: BTreeMap::new(),
                },
            );
            debug!("local route table created (vpc_id={vpc_id}, route_table_id={route_table_id})");
            Ok(route_table_id)
        })
    }

    async fn create_route(
        &self,
        route_table_id: &str,
        destination: &str,
        gateway_id: &str,
    ) -> Result<(), ProviderError> {
        let destination: Ipv4Network = destination.parse().map_err(|err| {
            ProviderError::InvalidParameter(format!("invalid route destination '{destination}': {err}"))
        })?;
        self.mutate(|state| {
            let table_vpc = state.route_table(route_table_id)?.vpc_id.clone();
            if state.gateway(gateway_id)?.attached_vpc.as_deref() != Some(table_vpc.as_str()) {
                return Err(ProviderError::InvalidParameter(format!(
                    "gateway {gateway_id} is not attached to {table_vpc}"
                )));
            }
            let key = destination.to_string();
            let table = state
                .route_tables
                .get_mut(route_table_id)
                .ok_or_else(|| not_found(ResourceKind::RouteTable, route_table_id))?;
            if table.routes.contains_key(&key) {
                return Err(ProviderError::InvalidParameter(format!(
                    "route {key} already exists in {route_table_id}"
                )));
            }
            table.routes.insert(key, gateway_id.to_string());
            Ok(())
        })
    }

    async fn associate_route_table(
        &self,
        route_table_id: &str,
        subnet_id: &str,
    ) -> Result<String, ProviderError> {
        self.mutate(|state| {
            let table_vpc = &state.route_table(route_table_id)?.vpc_id;
            let subnet_vpc = &state.subnet(subnet_id)?.vpc_id;
            if table_vpc != subnet_vpc {
                return Err(ProviderError::InvalidParameter(format!(
                    "route table {route_table_id} and subnet {subnet_id} belong to different networks"
                )));
            }
            if state
                .associations
                .values()
                .any(|assoc| assoc.subnet_id == subnet_id)
            {
                return Err(ProviderError::InvalidParameter(format!(
                    "subnet {subnet_id} is already associated with a route table"
                )));
            }
            let association_id = mint_id(ResourceKind::RouteTableAssociation);
            state.associations.insert(
                association_id.clone(),
                AssociationEntry {
                    route_table_id: route_table_id.to_string(),
                    subnet_id: subnet_id.to_string(),
                },
            );
            Ok(association_id)
        })
    }

    async fn route_table_associations(
        &self,
        route_table_id: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let state = self.state.lock();
        state.route_table(route_table_id)?;
        Ok(state
            .associations
            .iter()
            .filter(|(_, assoc)| assoc.route_table_id == route_table_id)
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn disassociate_route_table(&self, association_id: &str) -> Result<(), ProviderError> {
        self.mutate(|state| {
            state
                .associations
                .remove(association_id)
                .map(|_| ())
                .ok_or_else(|| not_found(ResourceKind::RouteTableAssociation, association_id))
        })
    }

    async fn delete_route_table(&self, route_table_id: &str) -> Result<(), ProviderError> {
        self.mutate(|state| {
            state.route_table(route_table_id)?;
            if state
                .associations
                .values()
                .any(|assoc| assoc.route_table_id == route_table_id)
            {
                return Err(ProviderError::DependencyViolation(format!(
                    "the route table '{route_table_id}' has associations and cannot be deleted"
                )));
            }
            state.route_tables.remove(route_table_id);
            state.tags.remove(route_table_id);
            debug!("local route table deleted (route_table_id={route_table_id})");
            Ok(())
        })
    }

    async fn create_tags(
        &self,
        resource_ids: &[String],
        tags: &[Tag],
    ) -> Result<(), ProviderError> {
        self.mutate(|state| {
            if let Some(missing) = resource_ids.iter().find(|id| !state.contains(id)) {
                let kind = ResourceKind::from_id(missing).ok_or_else(|| {
                    ProviderError::InvalidParameter(format!("invalid resource id '{missing}'"))
                })?;
                return Err(not_found(kind, missing));
            }
            for resource_id in resource_ids {
                let applied = state.tags.entry(resource_id.clone()).or_default();
                for tag in tags {
                    match applied.iter_mut().find(|existing| existing.key == tag.key) {
                        Some(existing) => existing.value = tag.value.clone(),
                        None => applied.push(tag.clone()),
                    }
                }
            }
            Ok(())
        })
    }
}

fn not_found(kind: ResourceKind, id: &str) -> ProviderError {
    ProviderError::NotFound {
        kind,
        id: id.to_string(),
    }
}

/// Mint an id shaped like the provider's, e.g. `vpc-0a1b2c3d4e5f60718`.
fn mint_id(kind: ResourceKind) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", kind.id_prefix(), &suffix[..ID_SUFFIX_LEN])
}

/// Parse and normalise an address block, enforcing the /16../28 window.
fn parse_block(kind: ResourceKind, raw: &str) -> Result<Ipv4Network, ProviderError> {
    let block: Ipv4Network = raw.parse().map_err(|err| ProviderError::InvalidRange {
        kind,
        message: format!("value ({raw}) for parameter cidrBlock is invalid: {err}"),
    })?;
    if !(MIN_PREFIX..=MAX_PREFIX).contains(&block.prefix()) {
        return Err(ProviderError::InvalidRange {
            kind,
            message: format!("the cidr '{raw}' is invalid; prefix must be between /{MIN_PREFIX} and /{MAX_PREFIX}"),
        });
    }
    Ipv4Network::new(block.network(), block.prefix()).map_err(|err| ProviderError::InvalidRange {
        kind,
        message: err.to_string(),
    })
}

fn overlaps(a: Ipv4Network, b: Ipv4Network) -> bool {
    a.contains(b.network()) || b.contains(a.network())
}

fn load_state(path: &Path) -> Result<LocalState, ProviderError> {
    if !path.exists() {
        return Ok(LocalState::default());
    }
    let raw = fs::read_to_string(path)
        .map_err(|err| ProviderError::State(format!("read {}: {err}", path.display())))?;
    if raw.trim().is_empty() {
        return Ok(LocalState::default());
    }
    serde_json::from_str(&raw)
        .map_err(|err| ProviderError::State(format!("decode {}: {err}", path.display())))
}

/// Write state to a sibling temp file, then rename over the target.
fn persist_state(path: &Path, state: &LocalState) -> Result<(), ProviderError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                ProviderError::State(format!("create {}: {err}", parent.display()))
            })?;
        }
    }
    let encoded = serde_json::to_vec_pretty(state)
        .map_err(|err| ProviderError::State(format!("encode state: {err}")))?;
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, encoded)
        .map_err(|err| ProviderError::State(format!("write {}: {err}", temp_path.display())))?;
    fs::rename(&temp_path, path).map_err(|err| {
        warn!(
            "local provider state rename failed (path={}, err={err})",
            path.display()
        );
        ProviderError::State(format!("rename {}: {err}", path.display()))
    })
}
