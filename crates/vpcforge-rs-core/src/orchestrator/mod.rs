//! Orchestrator Core

mod create;
mod saga;
mod steps;
mod teardown;

pub use steps::{CreationStep, Step, TeardownStep};
pub use teardown::VPC_ALREADY_GONE_NOTE;

use log::{debug, info};
use std::sync::Arc;
use vpcforge_rs_config::{OrchestratorConfig, ProviderKind, VpcForgeConfig};
use vpcforge_rs_protocol::{CreateNetworkRequest, NetworkRecord};
use vpcforge_rs_provider::{LocalNetworkProvider, NetworkProvider};
use vpcforge_rs_store::{MetadataStore, store_from_config};

use crate::error::OrchestratorError;
use crate::validation::{validate_create_request, validate_vpc_id};

/// Drives a network provider through the creation and teardown plans and
/// keeps the metadata table in step with the result.
///
/// The orchestrator holds no per-request state; share one instance behind an
/// `Arc` across requests.
#[derive(Clone)]
pub struct Orchestrator {
    provider: Arc<dyn NetworkProvider>,
    store: Arc<dyn MetadataStore>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create an orchestrator over explicit collaborators.
    pub fn new(
        provider: Arc<dyn NetworkProvider>,
        store: Arc<dyn MetadataStore>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            provider,
            store,
            config,
        }
    }

    /// Build the provider and store selected by `config`.
    pub fn from_config(config: &VpcForgeConfig) -> Result<Self, OrchestratorError> {
        let provider: Arc<dyn NetworkProvider> = match config.provider.kind {
            ProviderKind::Local => Arc::new(
                LocalNetworkProvider::from_config(&config.provider).map_err(|source| {
                    OrchestratorError::Setup(format!("provider: {source}"))
                })?,
            ),
        };
        let store = store_from_config(&config.store)?;
        info!(
            "orchestrator initialized (provider={}, region={}, store={:?})",
            provider.name(),
            provider.region(),
            config.store.kind
        );
        Ok(Self::new(provider, store, config.orchestrator.clone()))
    }

    /// Provider the orchestrator drives.
    pub fn provider(&self) -> &Arc<dyn NetworkProvider> {
        &self.provider
    }

    /// Store the orchestrator persists to.
    pub fn store(&self) -> &Arc<dyn MetadataStore> {
        &self.store
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Validate a create body and run the creation plan.
    pub async fn create_from_request(
        &self,
        request: Option<&CreateNetworkRequest>,
        request_id: Option<&str>,
    ) -> Result<NetworkRecord, OrchestratorError> {
        let validated = validate_create_request(request, &self.config.default_cidr_block)?;
        self.create_network(&validated.name, &validated.cidr_block, request_id)
            .await
    }

    /// Stored records, newest first, at most `limit` (config default when
    /// `None`). No provider calls are made.
    pub async fn list_networks(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<NetworkRecord>, OrchestratorError> {
        let limit = limit.unwrap_or(self.config.list_limit);
        if limit == 0 {
            return Err(OrchestratorError::Validation(
                "limit must be greater than 0".to_string(),
            ));
        }
        let records = self.store.list(limit).await?;
        debug!("listed networks (limit={limit}, returned={})", records.len());
        Ok(records)
    }

    /// Stored record for `vpc_id`. No provider calls are made.
    pub async fn get_network(&self, vpc_id: &str) -> Result<NetworkRecord, OrchestratorError> {
        validate_vpc_id(vpc_id)?;
        self.store
            .get(vpc_id)
            .await?
            .ok_or_else(|| OrchestratorError::NotFound(vpc_id.to_string()))
    }
}
