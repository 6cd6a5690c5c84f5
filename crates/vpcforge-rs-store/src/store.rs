//! Metadata store interface.

use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use vpcforge_rs_config::{StoreConfig, StoreKind};
use vpcforge_rs_protocol::{NetworkRecord, NetworkStatus};

use crate::error::StoreError;
use crate::file::FileMetadataStore;
use crate::memory::InMemoryMetadataStore;

/// Single-table store of network records keyed by `vpc_id`.
///
/// Every operation touches one record; there are no multi-record
/// transactions.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert or replace a record.
    async fn put(&self, record: NetworkRecord) -> Result<(), StoreError>;

    /// Fetch a record by id.
    async fn get(&self, vpc_id: &str) -> Result<Option<NetworkRecord>, StoreError>;

    /// Up to `limit` records, newest `created_at` first.
    async fn list(&self, limit: usize) -> Result<Vec<NetworkRecord>, StoreError>;

    /// Set the status of an existing record. Returns `false` if absent.
    async fn update_status(&self, vpc_id: &str, status: NetworkStatus)
    -> Result<bool, StoreError>;

    /// Remove a record. Returns `false` if absent.
    async fn delete(&self, vpc_id: &str) -> Result<bool, StoreError>;
}

/// Build the store selected by the `store` config section.
pub fn store_from_config(config: &StoreConfig) -> Result<Arc<dyn MetadataStore>, StoreError> {
    match config.kind {
        StoreKind::File => {
            let store = FileMetadataStore::new(config.resolved_path(), &config.table_name)?;
            Ok(Arc::new(store))
        }
        StoreKind::Memory => {
            info!("using in-memory metadata store (table={})", config.table_name);
            Ok(Arc::new(InMemoryMetadataStore::new()))
        }
    }
}

/// Order newest first and keep at most `limit` records.
pub(crate) fn newest_first(mut records: Vec<NetworkRecord>, limit: usize) -> Vec<NetworkRecord> {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.vpc_id.cmp(&b.vpc_id))
    });
    records.truncate(limit);
    records
}
