//! Shared test helpers for the planner, executor and agent tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tandem_core::error::{ProviderError, ToolError};
use tandem_core::message::ToolCall;
use tandem_core::provider::{ChatReply, ChatRequest, Provider};
use tandem_core::tool::Tool;
use tandem_providers::{ChatBackend, RetryPolicy};

/// A mock provider that returns a sequence of scripted replies and records
/// every request it receives.
///
/// Panics if more calls are made than replies provided.
pub struct SequentialMockProvider {
    replies: Mutex<VecDeque<Result<ChatReply, ProviderError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl SequentialMockProvider {
    pub fn new(replies: Vec<ChatReply>) -> Arc<Self> {
        Self::with_results(replies.into_iter().map(Ok).collect())
    }

    pub fn with_results(replies: Vec<Result<ChatReply, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatReply, ProviderError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("SequentialMockProvider: no reply scripted for call #{call}"))
    }
}

/// A backend over `provider` that never sleeps between attempts.
pub fn backend(provider: Arc<SequentialMockProvider>) -> ChatBackend {
    ChatBackend::new(provider, "mock-model").with_retry(RetryPolicy::no_retry())
}

/// Helper to create a tool call.
pub fn tool_call(id: &str, name: &str, args: serde_json::Value) -> ToolCall {
    ToolCall::function(id, name, args.to_string())
}

/// Always returns `{"ok": true}`.
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echoes back the input"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        Ok(serde_json::json!({"ok": true}))
    }
}

/// Always fails.
pub struct BrokenTool;

#[async_trait]
impl Tool for BrokenTool {
    fn name(&self) -> &str {
        "broken"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object"})
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool_name: "broken".into(),
            reason: "disk on fire".into(),
        })
    }
}

/// Planner content for a plan with the given tasks.
pub fn plan_json(tasks: &[(i64, &str)]) -> String {
    let plan: Vec<_> = tasks
        .iter()
        .map(|(id, description)| serde_json::json!({"id": id, "description": description}))
        .collect();
    serde_json::json!({ "plan": plan }).to_string()
}
