//! The executor cycle: resolve one task into text.
//!
//! 1. **Send** the executor transcript with `tool_choice = auto`
//! 2. **If tool calls**: record them, run each tool in order, append one
//!    function-role message per call, re-send with `tool_choice = none`
//! 3. **If text**: return it
//!
//! The loop is bounded by `max_tool_rounds`. Tool failures are fatal.

use std::sync::Arc;

use chrono::Utc;
use tandem_core::error::{AgentError, ToolError};
use tandem_core::event::{DomainEvent, EventBus};
use tandem_core::message::ChatMessage;
use tandem_core::provider::ToolChoice;
use tandem_core::tool::ToolRegistry;
use tandem_providers::ChatBackend;
use tracing::{debug, warn};

pub const DEFAULT_MAX_TOOL_ROUNDS: u32 = 8;

pub struct Executor {
    backend: ChatBackend,
    max_tool_rounds: u32,
    event_bus: Arc<EventBus>,
}

impl Executor {
    pub fn new(backend: ChatBackend, event_bus: Arc<EventBus>) -> Self {
        Self {
            backend,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            event_bus,
        }
    }

    /// Set the maximum number of tool rounds per task.
    pub fn with_max_tool_rounds(mut self, max: u32) -> Self {
        self.max_tool_rounds = max;
        self
    }

    /// Run one task to completion and return the executor's text.
    ///
    /// Works on a copy of `exec_messages`; the caller's transcript is left
    /// untouched.
    pub async fn run_once(
        &self,
        exec_messages: &[ChatMessage],
        tools: &[serde_json::Value],
        registry: Option<&ToolRegistry>,
    ) -> tandem_core::Result<String> {
        let mut messages = exec_messages.to_vec();
        self.run_in(&mut messages, tools, registry).await
    }

    async fn run_in(
        &self,
        messages: &mut Vec<ChatMessage>,
        tools: &[serde_json::Value],
        registry: Option<&ToolRegistry>,
    ) -> tandem_core::Result<String> {
        let mut reply = self
            .backend
            .chat(messages, tools, Some(ToolChoice::Auto))
            .await?;
        let mut rounds = 0;

        while reply.has_tool_calls() {
            if rounds >= self.max_tool_rounds {
                warn!(rounds, "Executor still requesting tools at the round limit");
                return Err(AgentError::ToolLoopExceeded { rounds }.into());
            }
            rounds += 1;

            let registry = registry.ok_or(AgentError::MissingToolRegistry)?;

            debug!(round = rounds, tool_count = reply.tool_calls.len(), "Executing tool calls");

            let tool_calls = std::mem::take(&mut reply.tool_calls);
            messages.push(ChatMessage::assistant_tool_calls(tool_calls.clone()));

            for call in &tool_calls {
                let name = call.function.name.as_str();
                if !registry.contains(name) {
                    return Err(AgentError::UnknownTool(name.to_string()).into());
                }

                let arguments = call
                    .function
                    .parsed_arguments()
                    .map_err(|e| ToolError::InvalidArguments(format!("{name}: {e}")))?;

                let start = std::time::Instant::now();
                let result = registry.execute(name, arguments).await;
                let duration_ms = start.elapsed().as_millis() as u64;

                self.event_bus.publish(DomainEvent::ToolExecuted {
                    tool_name: name.to_string(),
                    success: result.is_ok(),
                    duration_ms,
                    timestamp: Utc::now(),
                });

                let output = result.inspect_err(|e| {
                    warn!(tool = %name, error = %e, "Tool execution failed");
                })?;

                messages.push(ChatMessage::function_result(
                    &call.id,
                    name,
                    serde_json::to_string(&output)?,
                ));
            }

            reply = self
                .backend
                .chat(messages, tools, Some(ToolChoice::None))
                .await?;
        }

        Ok(reply.content.unwrap_or_default())
    }
}
