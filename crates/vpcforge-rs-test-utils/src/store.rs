use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use vpcforge_rs_protocol::{NetworkRecord, NetworkStatus};
use vpcforge_rs_store::{InMemoryMetadataStore, MetadataStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Put,
    Get,
    List,
    UpdateStatus,
    Delete,
}

/// In-memory store whose selected operations fail with `Unavailable`.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: InMemoryMetadataStore,
    failing: Mutex<HashSet<StoreOp>>,
    purging: Mutex<HashSet<StoreOp>>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(self, op: StoreOp) -> Self {
        self.failing.lock().insert(op);
        self
    }

    /// Drop the targeted record right before `op` runs, as if another
    /// caller had just deleted it.
    pub fn purge_before(self, op: StoreOp) -> Self {
        self.purging.lock().insert(op);
        self
    }

    pub fn set_failing(&self, op: StoreOp, failing: bool) {
        let mut ops = self.failing.lock();
        if failing {
            ops.insert(op);
        } else {
            ops.remove(&op);
        }
    }

    pub fn inner(&self) -> &InMemoryMetadataStore {
        &self.inner
    }

    async fn purge_if_armed(&self, op: StoreOp, vpc_id: &str) -> Result<(), StoreError> {
        let armed = self.purging.lock().contains(&op);
        if armed {
            self.inner.delete(vpc_id).await?;
        }
        Ok(())
    }

    fn check(&self, op: StoreOp) -> Result<(), StoreError> {
        if self.failing.lock().contains(&op) {
            Err(StoreError::Unavailable(format!("injected {op:?} failure")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MetadataStore for FailingStore {
    async fn put(&self, record: NetworkRecord) -> Result<(), StoreError> {
        self.check(StoreOp::Put)?;
        self.inner.put(record).await
    }

    async fn get(&self, vpc_id: &str) -> Result<Option<NetworkRecord>, StoreError> {
        self.check(StoreOp::Get)?;
        self.purge_if_armed(StoreOp::Get, vpc_id).await?;
        self.inner.get(vpc_id).await
    }

    async fn list(&self, limit: usize) -> Result<Vec<NetworkRecord>, StoreError> {
        self.check(StoreOp::List)?;
        self.inner.list(limit).await
    }

    async fn update_status(
        &self,
        vpc_id: &str,
        status: NetworkStatus,
    ) -> Result<bool, StoreError> {
        self.check(StoreOp::UpdateStatus)?;
        self.purge_if_armed(StoreOp::UpdateStatus, vpc_id).await?;
        self.inner.update_status(vpc_id, status).await
    }

    async fn delete(&self, vpc_id: &str) -> Result<bool, StoreError> {
        self.check(StoreOp::Delete)?;
        self.purge_if_armed(StoreOp::Delete, vpc_id).await?;
        self.inner.delete(vpc_id).await
    }
}
