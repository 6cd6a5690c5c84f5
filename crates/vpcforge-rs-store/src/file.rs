//! JSONL-backed metadata table.

use async_trait::async_trait;
use log::{debug, info};
use parking_lot::Mutex;
use regex::Regex;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use vpcforge_rs_protocol::{NetworkRecord, NetworkStatus};

use crate::error::StoreError;
use crate::store::{MetadataStore, newest_first};

/// Table names follow the key-value service's naming rules.
const TABLE_NAME_PATTERN: &str = r"^[A-Za-z0-9_.-]{3,255}$";

/// Metadata table stored as one JSON record per line in `<root>/<table>.jsonl`.
///
/// Writes rewrite the whole file through a temp file and rename, so readers
/// never observe a half-written table.
#[derive(Debug)]
pub struct FileMetadataStore {
    /// Directory holding table files.
    root: PathBuf,
    table_name: String,
    /// Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl FileMetadataStore {
    /// Open (or create) a table under `root`.
    pub fn new(root: impl AsRef<Path>, table_name: &str) -> Result<Self, StoreError> {
        validate_table_name(table_name)?;
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        info!(
            "initialized file metadata store (root={}, table={table_name})",
            root.display()
        );
        Ok(Self {
            root,
            table_name: table_name.to_string(),
            lock: Mutex::new(()),
        })
    }

    /// Path to the table file.
    pub fn table_path(&self) -> PathBuf {
        self.root.join(format!("{}.jsonl", self.table_name))
    }

    fn temp_path(&self) -> PathBuf {
        self.root.join(format!("{}.jsonl.tmp", self.table_name))
    }

    /// Load every record in the table.
    fn load_records(&self) -> Result<Vec<NetworkRecord>, StoreError> {
        let path = self.table_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = OpenOptions::new().read(true).open(path)?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }
        Ok(records)
    }

    /// Rewrite the table atomically.
    fn write_records(&self, records: &[NetworkRecord]) -> Result<(), StoreError> {
        let path = self.table_path();
        let temp_path = self.temp_path();
        {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            for record in records {
                let line = serde_json::to_string(record)?;
                writeln!(file, "{line}")?;
            }
            file.sync_all()?;
        }
        std::fs::rename(temp_path, path)?;
        Ok(())
    }

    /// Apply `change` to the loaded table and write it back when it reports a
    /// modification.
    fn modify(
        &self,
        change: impl FnOnce(&mut Vec<NetworkRecord>) -> bool,
    ) -> Result<bool, StoreError> {
        let _guard = self.lock.lock();
        let mut records = self.load_records()?;
        let changed = change(&mut records);
        if changed {
            self.write_records(&records)?;
        }
        Ok(changed)
    }
}

#[async_trait]
impl MetadataStore for FileMetadataStore {
    async fn put(&self, record: NetworkRecord) -> Result<(), StoreError> {
        let vpc_id = record.vpc_id.clone();
        self.modify(|records| {
            match records.iter_mut().find(|existing| existing.vpc_id == record.vpc_id) {
                Some(existing) => *existing = record,
                None => records.push(record),
            }
            true
        })?;
        debug!("stored network record (table={}, vpc_id={vpc_id})", self.table_name);
        Ok(())
    }

    async fn get(&self, vpc_id: &str) -> Result<Option<NetworkRecord>, StoreError> {
        let _guard = self.lock.lock();
        Ok(self
            .load_records()?
            .into_iter()
            .find(|record| record.vpc_id == vpc_id))
    }

    async fn list(&self, limit: usize) -> Result<Vec<NetworkRecord>, StoreError> {
        let records = {
            let _guard = self.lock.lock();
            self.load_records()?
        };
        let total = records.len();
        let records = newest_first(records, limit);
        debug!(
            "listed network records (table={}, total={total}, returned={})",
            self.table_name,
            records.len()
        );
        Ok(records)
    }

    async fn update_status(
        &self,
        vpc_id: &str,
        status: NetworkStatus,
    ) -> Result<bool, StoreError> {
        let updated = self.modify(|records| {
            match records.iter_mut().find(|record| record.vpc_id == vpc_id) {
                Some(record) => {
                    record.status = status;
                    true
                }
                None => false,
            }
        })?;
        debug!("updated network status (vpc_id={vpc_id}, status={status}, found={updated})");
        Ok(updated)
    }

    async fn delete(&self, vpc_id: &str) -> Result<bool, StoreError> {
        let removed = self.modify(|records| {
            let before = records.len();
            records.retain(|record| record.vpc_id != vpc_id);
            records.len() != before
        })?;
        debug!("deleted network record (vpc_id={vpc_id}, found={removed})");
        Ok(removed)
    }
}

fn validate_table_name(table_name: &str) -> Result<(), StoreError> {
    let pattern =
        Regex::new(TABLE_NAME_PATTERN).map_err(|err| StoreError::InvalidTable(err.to_string()))?;
    if pattern.is_match(table_name) {
        Ok(())
    } else {
        Err(StoreError::InvalidTable(format!(
            "'{table_name}' must be 3-255 characters of letters, digits, '_', '-', or '.'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use tempfile::tempdir;
    use vpcforge_rs_protocol::{SubnetKind, SubnetRecord};

    fn record(vpc_id: &str, minutes: i64) -> NetworkRecord {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        NetworkRecord {
            vpc_id: vpc_id.to_string(),
            name: format!("net-{vpc_id}"),
            cidr_block: "10.0.0.0/16".to_string(),
            region: "us-east-2".to_string(),
            subnets: vec![SubnetRecord {
                subnet_id: "subnet-1".to_string(),
                cidr_block: "10.0.1.0/24".to_string(),
                availability_zone: "us-east-2a".to_string(),
                kind: SubnetKind::Public,
            }],
            internet_gateway_id: Some("igw-1".to_string()),
            route_tables: BTreeMap::new(),
            status: NetworkStatus::Available,
            created_at: base + Duration::minutes(minutes),
            deleted_at: None,
            created_by: "vpc-api".to_string(),
        }
    }

    #[tokio::test]
    async fn put_get_and_replace() {
        let temp = tempdir().expect("tmp");
        let store = FileMetadataStore::new(temp.path(), "vpc-metadata").expect("store");
        store.put(record("vpc-aaaaaaaa", 0)).await.expect("put");

        let mut replacement = record("vpc-aaaaaaaa", 0);
        replacement.name = "renamed".to_string();
        store.put(replacement.clone()).await.expect("replace");

        let loaded = store.get("vpc-aaaaaaaa").await.expect("get");
        assert_eq!(loaded, Some(replacement));
        assert_eq!(store.list(10).await.expect("list").len(), 1);
        assert_eq!(store.get("vpc-bbbbbbbb").await.expect("get"), None);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_limited() {
        let temp = tempdir().expect("tmp");
        let store = FileMetadataStore::new(temp.path(), "vpc-metadata").expect("store");
        store.put(record("vpc-00000001", 0)).await.expect("put");
        store.put(record("vpc-00000002", 10)).await.expect("put");
        store.put(record("vpc-00000003", 5)).await.expect("put");

        let ids: Vec<String> = store
            .list(2)
            .await
            .expect("list")
            .into_iter()
            .map(|r| r.vpc_id)
            .collect();
        assert_eq!(ids, vec!["vpc-00000002".to_string(), "vpc-00000003".to_string()]);
    }

    #[tokio::test]
    async fn status_update_and_delete_report_presence() {
        let temp = tempdir().expect("tmp");
        let store = FileMetadataStore::new(temp.path(), "vpc-metadata").expect("store");
        store.put(record("vpc-aaaaaaaa", 0)).await.expect("put");

        assert!(
            store
                .update_status("vpc-aaaaaaaa", NetworkStatus::Deleting)
                .await
                .expect("update")
        );
        assert!(
            !store
                .update_status("vpc-missing1", NetworkStatus::Deleting)
                .await
                .expect("update")
        );
        let loaded = store.get("vpc-aaaaaaaa").await.expect("get").expect("record");
        assert_eq!(loaded.status, NetworkStatus::Deleting);

        assert!(store.delete("vpc-aaaaaaaa").await.expect("delete"));
        assert!(!store.delete("vpc-aaaaaaaa").await.expect("delete again"));
        assert!(store.list(10).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn table_survives_reopen() {
        let temp = tempdir().expect("tmp");
        {
            let store = FileMetadataStore::new(temp.path(), "vpc-metadata").expect("store");
            store.put(record("vpc-aaaaaaaa", 0)).await.expect("put");
        }
        let store = FileMetadataStore::new(temp.path(), "vpc-metadata").expect("reopen");
        assert!(store.table_path().ends_with("vpc-metadata.jsonl"));
        assert!(store.get("vpc-aaaaaaaa").await.expect("get").is_some());
    }

    #[test]
    fn rejects_bad_table_names() {
        let temp = tempdir().expect("tmp");
        for name in ["", "ab", "has space", "slash/name"] {
            let err = FileMetadataStore::new(temp.path(), name).unwrap_err();
            assert!(matches!(err, StoreError::InvalidTable(_)), "{name}");
        }
    }
}
