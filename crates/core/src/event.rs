//! Domain event system: progress notifications from the agent loop.
//!
//! The planner and executor publish events as they move between states.
//! Subscribers (the CLI progress printer, tests) react without coupling to
//! the orchestration code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// The planner produced a plan
    PlanProduced {
        session_id: String,
        cycle: u32,
        tasks: usize,
        timestamp: DateTime<Utc>,
    },

    /// A task was handed to the executor
    TaskStarted {
        session_id: String,
        task_id: i64,
        description: String,
        timestamp: DateTime<Utc>,
    },

    /// The executor resolved a task
    TaskCompleted {
        session_id: String,
        task_id: i64,
        result: String,
        timestamp: DateTime<Utc>,
    },

    /// A tool was executed
    ToolExecuted {
        tool_name: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// The planner emitted the final-answer sentinel
    FinalAnswer {
        session_id: String,
        cycle: u32,
        answer: String,
        timestamp: DateTime<Utc>,
    },

    /// A memory record was persisted
    MemoryAppended {
        role: String,
        lines: usize,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
