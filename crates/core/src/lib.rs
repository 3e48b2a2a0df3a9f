//! # Tandem Core
//!
//! Domain types, traits, and error definitions for the Tandem planner/executor
//! agent. This crate has **no transport dependencies**: it defines the domain
//! model that the provider, memory, tool and agent crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator of the agent loop is a trait here:
//! - [`Provider`] for the remote chat service
//! - [`MemoryStore`] for the append-only memory log
//! - [`Tool`] for locally invocable functions
//!
//! Implementations live in their respective crates, so the orchestration
//! engine can be driven by scripted mocks in tests.

pub mod error;
pub mod event;
pub mod memory;
pub mod message;
pub mod plan;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{AgentError, Error, MemoryError, ProviderError, Result, ToolError};
pub use event::{DomainEvent, EventBus};
pub use memory::{MemoryRecord, MemoryStore, UserId};
pub use message::{ChatMessage, FunctionCall, Role, Session, SessionId, ToolCall};
pub use plan::{Plan, PlannerOutput, Task};
pub use provider::{ChatReply, ChatRequest, Provider, ToolChoice};
pub use tool::{Tool, ToolRegistry};
