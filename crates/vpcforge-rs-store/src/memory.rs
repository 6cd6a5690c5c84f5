//! Process-local metadata table.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use vpcforge_rs_protocol::{NetworkRecord, NetworkStatus};

use crate::error::StoreError;
use crate::store::{MetadataStore, newest_first};

/// Metadata store held entirely in memory; contents are lost on exit.
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    records: RwLock<HashMap<String, NetworkRecord>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn put(&self, record: NetworkRecord) -> Result<(), StoreError> {
        self.records.write().insert(record.vpc_id.clone(), record);
        Ok(())
    }

    async fn get(&self, vpc_id: &str) -> Result<Option<NetworkRecord>, StoreError> {
        Ok(self.records.read().get(vpc_id).cloned())
    }

    async fn list(&self, limit: usize) -> Result<Vec<NetworkRecord>, StoreError> {
        let records = self.records.read().values().cloned().collect();
        Ok(newest_first(records, limit))
    }

    async fn update_status(
        &self,
        vpc_id: &str,
        status: NetworkStatus,
    ) -> Result<bool, StoreError> {
        Ok(match self.records.write().get_mut(vpc_id) {
            Some(record) => {
                record.status = status;
                true
            }
            None => false,
        })
    }

    async fn delete(&self, vpc_id: &str) -> Result<bool, StoreError> {
        Ok(self.records.write().remove(vpc_id).is_some())
    }
}
