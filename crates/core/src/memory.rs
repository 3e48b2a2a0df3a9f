//! Memory trait: a durable, role-scoped, append-only log of distilled facts.
//!
//! Records are created by `Agent::backward`, read back by `Agent::forward`
//! (filtered by role, most recent K), and never mutated or deleted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MemoryError;

/// Identifier of the user whose feedback produced a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Numeric(i64),
    Named(String),
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId::Numeric(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        // Only canonical integers become numeric, so the id round-trips as typed
        match id.parse::<i64>() {
            Ok(n) if n.to_string() == id => UserId::Numeric(n),
            _ => UserId::Named(id.to_string()),
        }
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserId::Numeric(n) => write!(f, "{n}"),
            UserId::Named(s) => f.write_str(s),
        }
    }
}

/// One persisted memory record (one line of the log).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub user_id: UserId,

    /// Agent role that owns this record (e.g. "user_agent")
    pub role: String,

    /// Distilled facts, one per line
    pub memory: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl MemoryRecord {
    pub fn new(user_id: UserId, role: impl Into<String>, memory: Vec<String>) -> Self {
        Self {
            user_id,
            role: role.into(),
            memory,
            created_at: Some(Utc::now()),
        }
    }
}

/// Keep the records for `role`, truncated to the last `recent_k` in log order.
pub fn recent_for_role<I>(records: I, role: &str, recent_k: usize) -> Vec<MemoryRecord>
where
    I: IntoIterator<Item = MemoryRecord>,
{
    let mut matching: Vec<MemoryRecord> = records.into_iter().filter(|r| r.role == role).collect();
    let skip = matching.len().saturating_sub(recent_k);
    matching.drain(..skip);
    matching
}

/// The core MemoryStore trait.
///
/// Implementations: JSONL file, in-memory (for testing).
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// The store name (e.g., "jsonl", "in_memory").
    fn name(&self) -> &str;

    /// Records for `role`, the most recent `recent_k`, oldest first.
    async fn read(
        &self,
        role: &str,
        recent_k: usize,
    ) -> std::result::Result<Vec<MemoryRecord>, MemoryError>;

    /// Durably append one record.
    async fn append(&self, record: &MemoryRecord) -> std::result::Result<(), MemoryError>;
}
