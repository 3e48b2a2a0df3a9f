//! File-based memory store: an append-only JSON-lines log.
//!
//! Each line is one JSON-encoded `MemoryRecord`. The file is opened fresh
//! for every read and every append, so records written by another process
//! are visible on the next read.
//!
//! Default location: `~/.tandem/memory/all_memory.jsonl`

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tandem_core::error::MemoryError;
use tandem_core::memory::{recent_for_role, MemoryRecord, MemoryStore};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// A JSONL-backed memory store.
///
/// Appends within one process are serialized so concurrent writers never
/// interleave partial lines.
pub struct JsonlMemoryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlMemoryStore {
    /// Create a store over `path`. Nothing is touched on disk until the
    /// first read or append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse every well-formed record in file order.
    ///
    /// Lines are decoded one by one, so a torn or non-UTF-8 line only costs
    /// that line.
    fn parse_lines(content: &[u8]) -> Vec<MemoryRecord> {
        content
            .split(|&b| b == b'\n')
            .enumerate()
            .filter(|(_, line)| !line.trim_ascii().is_empty())
            .filter_map(|(idx, line)| match serde_json::from_slice::<MemoryRecord>(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(line = idx + 1, error = %e, "Skipping malformed memory record");
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl MemoryStore for JsonlMemoryStore {
    fn name(&self) -> &str {
        "jsonl"
    }

    async fn read(&self, role: &str, recent_k: usize) -> Result<Vec<MemoryRecord>, MemoryError> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Memory file not found, reading as empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(MemoryError::Storage(format!(
                    "Failed to read memory file {}: {e}",
                    self.path.display()
                )));
            }
        };

        let records = recent_for_role(Self::parse_lines(&content), role, recent_k);
        debug!(role, count = records.len(), "Loaded memory records");
        Ok(records)
    }

    async fn append(&self, record: &MemoryRecord) -> Result<(), MemoryError> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| MemoryError::Serialization(e.to_string()))?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;

        // The parent directory must already exist
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                MemoryError::Storage(format!(
                    "Failed to open memory file {}: {e}",
                    self.path.display()
                ))
            })?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| MemoryError::Storage(format!("Failed to write memory record: {e}")))?;
        file.flush()
            .await
            .map_err(|e| MemoryError::Storage(format!("Failed to flush memory file: {e}")))?;

        debug!(role = %record.role, lines = record.memory.len(), "Appended memory record");
        Ok(())
    }
}
