//! Provider trait: the abstraction over the remote chat service.
//!
//! A Provider knows how to send one chat request and return the normalized
//! reply. Retry, model binding and output limits are layered on top by
//! `tandem-providers::ChatBackend`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::{ChatMessage, ToolCall};

/// How the model may use the supplied tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    /// The model decides whether to call tools
    Auto,
    /// The model must answer in text
    None,
    /// The model must call this function
    Function(String),
}

impl ToolChoice {
    /// The `tool_choice` value of a chat-completions request.
    pub fn to_wire(&self) -> serde_json::Value {
        match self {
            ToolChoice::Auto => serde_json::json!("auto"),
            ToolChoice::None => serde_json::json!("none"),
            ToolChoice::Function(name) => serde_json::json!({
                "type": "function",
                "function": { "name": name }
            }),
        }
    }
}

/// One chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The model to use (e.g., "gpt-4o")
    pub model: String,

    /// The conversation so far
    pub messages: Vec<ChatMessage>,

    /// Maximum tokens to generate
    pub max_output_tokens: u32,

    /// Tool schema descriptors, passed through verbatim
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<serde_json::Value>,

    /// Only meaningful alongside `tools`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
}

/// The normalized reply: text, tool calls, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub content: Option<String>,

    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl ChatReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: None,
            tool_calls,
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Content as text, empty when null.
    pub fn content_str(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// The core Provider trait.
///
/// The agent loop calls `chat()` without knowing which endpoint answers.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a request and get the normalized reply. Implementations do not retry.
    async fn chat(&self, request: ChatRequest) -> std::result::Result<ChatReply, ProviderError>;
}
