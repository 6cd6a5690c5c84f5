//! Configuration schema for vpcforge.

use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root config for the vpcforge service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VpcForgeConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

impl VpcForgeConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> VpcForgeConfigBuilder {
        VpcForgeConfigBuilder::new()
    }
}

/// Builder for assembling a `VpcForgeConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct VpcForgeConfigBuilder {
    config: VpcForgeConfig,
}

impl VpcForgeConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: VpcForgeConfig::default(),
        }
    }

    /// Replace the HTTP server configuration.
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.config.server = server;
        self
    }

    /// Replace the network provider configuration.
    pub fn provider(mut self, provider: ProviderConfig) -> Self {
        self.config.provider = provider;
        self
    }

    /// Replace the metadata store configuration.
    pub fn store(mut self, store: StoreConfig) -> Self {
        self.config.store = store;
        self
    }

    /// Replace the orchestrator configuration.
    pub fn orchestrator(mut self, orchestrator: OrchestratorConfig) -> Self {
        self.config.orchestrator = orchestrator;
        self
    }

    /// Finalize and return the built `VpcForgeConfig`.
    pub fn build(self) -> VpcForgeConfig {
        self.config
    }
}

/// HTTP listener and request authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Pre-shared key required on every request; `None` disables the check.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
    #[serde(default = "default_true")]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            api_key: None,
            api_key_header: default_api_key_header(),
            cors: true,
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_api_key_header() -> String {
    "x-api-key".to_string()
}

fn default_true() -> bool {
    true
}

/// Which network provider implementation to construct.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// In-process provider emulation.
    #[default]
    Local,
}

/// Network provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,
    #[serde(default = "default_region")]
    pub region: String,
    /// Zones reported as available; defaults to `<region>a..c`.
    #[serde(default)]
    pub availability_zones: Option<Vec<String>>,
    /// Maximum number of networks the provider admits.
    #[serde(default = "default_max_networks")]
    pub max_networks: usize,
    /// Optional JSON file the local provider persists its state to.
    #[serde(default)]
    pub state_path: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kind: ProviderKind::default(),
            region: default_region(),
            availability_zones: None,
            max_networks: default_max_networks(),
            state_path: None,
        }
    }
}

impl ProviderConfig {
    /// Configured zones or the `<region>a`, `<region>b`, `<region>c` defaults.
    pub fn zones(&self) -> Vec<String> {
        match &self.availability_zones {
            Some(zones) => zones.clone(),
            None => ["a", "b", "c"]
                .iter()
                .map(|suffix| format!("{}{suffix}", self.region))
                .collect(),
        }
    }
}

fn default_region() -> String {
    "us-east-2".to_string()
}

fn default_max_networks() -> usize {
    5
}

/// Which metadata store implementation to construct.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// JSONL table on disk.
    #[default]
    File,
    /// Process-local table, lost on exit.
    Memory,
}

/// Metadata store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub kind: StoreKind,
    #[serde(default = "default_table_name")]
    pub table_name: String,
    /// Directory holding table files; defaults to `~/.vpcforge/tables`.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            table_name: default_table_name(),
            path: None,
        }
    }
}

impl StoreConfig {
    /// Resolve the table directory, falling back to the user's home.
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return PathBuf::from(path);
        }
        match UserDirs::new() {
            Some(dirs) => dirs.home_dir().join(".vpcforge").join("tables"),
            None => PathBuf::from(".vpcforge").join("tables"),
        }
    }
}

fn default_table_name() -> String {
    "vpc-metadata".to_string()
}

/// Creation and listing defaults for the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Address block used when a create request omits one.
    #[serde(default = "default_cidr_block")]
    pub default_cidr_block: String,
    /// Value of the `ManagedBy` tag and of `created_by` on records.
    #[serde(default = "default_managed_by")]
    pub managed_by: String,
    /// Enable DNS support and hostnames on created networks.
    #[serde(default = "default_true")]
    pub enable_dns: bool,
    /// Default page size for listings.
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_cidr_block: default_cidr_block(),
            managed_by: default_managed_by(),
            enable_dns: true,
            list_limit: default_list_limit(),
        }
    }
}

fn default_cidr_block() -> String {
    "10.0.0.0/16".to_string()
}

fn default_managed_by() -> String {
    "vpc-api".to_string()
}

fn default_list_limit() -> usize {
    100
}
