//! In-memory store, useful for testing and ephemeral sessions.

use async_trait::async_trait;
use tandem_core::error::MemoryError;
use tandem_core::memory::{recent_for_role, MemoryRecord, MemoryStore};
use tokio::sync::RwLock;

/// Keeps records in a Vec in append order. Nothing survives the process.
#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<MemoryRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records.
    pub fn with_records(records: Vec<MemoryRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Every record, all roles.
    pub async fn all(&self) -> Vec<MemoryRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn read(&self, role: &str, recent_k: usize) -> Result<Vec<MemoryRecord>, MemoryError> {
        let records = self.records.read().await;
        Ok(recent_for_role(records.iter().cloned(), role, recent_k))
    }

    async fn append(&self, record: &MemoryRecord) -> Result<(), MemoryError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }
}
