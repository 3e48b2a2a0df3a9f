//! A provider bound to one model, with retry.
//!
//! The planner, executor and memory updater each hold their own
//! [`ChatBackend`]. Every call is a full request: the whole message list is
//! sent each time, so retrying an identical request is safe.

use std::sync::Arc;

use tandem_config::AppConfig;
use tandem_core::error::ProviderError;
use tandem_core::message::ChatMessage;
use tandem_core::provider::{ChatReply, ChatRequest, ToolChoice};
use tandem_core::Provider;
use tracing::debug;

use crate::retry::RetryPolicy;

/// A chat completion capability for one model.
#[derive(Clone)]
pub struct ChatBackend {
    provider: Arc<dyn Provider>,
    model: String,
    max_output_tokens: u32,
    retry: RetryPolicy,
}

impl ChatBackend {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            max_output_tokens: 1024,
            retry: RetryPolicy::default(),
        }
    }

    /// Bind `provider` to `model` with the configured token cap and backoff.
    pub fn from_config(provider: Arc<dyn Provider>, model: &str, config: &AppConfig) -> Self {
        Self::new(provider, model)
            .with_max_output_tokens(config.max_output_tokens)
            .with_retry(RetryPolicy::from_config(&config.retry))
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Send `messages` and return the first choice.
    ///
    /// `tools` are the function schemas the model may call. `tool_choice`
    /// only takes effect when `tools` is non-empty. Transient failures are
    /// retried per the backend's [`RetryPolicy`]; after the last attempt the
    /// final error is returned.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[serde_json::Value],
        tool_choice: Option<ToolChoice>,
    ) -> Result<ChatReply, ProviderError> {
        if messages.is_empty() {
            return Err(ProviderError::InvalidRequest(
                "chat called with no messages".into(),
            ));
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            max_output_tokens: self.max_output_tokens,
            tools: tools.to_vec(),
            tool_choice,
        };

        debug!(
            model = %self.model,
            messages = messages.len(),
            tools = tools.len(),
            "Calling chat backend"
        );

        let context = format!("{}/{}", self.provider.name(), self.model);
        self.retry
            .run(&context, || self.provider.chat(request.clone()))
            .await
    }
}

impl std::fmt::Debug for ChatBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatBackend")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("retry", &self.retry)
            .finish()
    }
}
