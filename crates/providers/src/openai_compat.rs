//! OpenAI-compatible chat provider.
//!
//! Works with OpenAI, OpenRouter, vLLM, Ollama and any endpoint exposing
//! `POST /chat/completions`. Replies are normalized into [`ChatReply`]:
//! modern `tool_calls` lists and the legacy single `function_call` both become
//! [`ToolCall`]s with string-encoded arguments.

use async_trait::async_trait;
use serde::Deserialize;
use tandem_core::error::ProviderError;
use tandem_core::message::ToolCall;
use tandem_core::provider::{ChatReply, ChatRequest};
use tracing::{debug, warn};

/// An OpenAI-compatible chat provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Create an OpenAI provider (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::new("openai", "https://api.openai.com/v1", api_key)
    }

    /// Build the JSON request body.
    ///
    /// `tools` and `tool_choice` are only sent when tools are present.
    fn request_body(request: &ChatRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": request.messages,
            "max_tokens": request.max_output_tokens,
        });

        if !request.tools.is_empty() {
            body["tools"] = serde_json::Value::Array(request.tools.clone());
            if let Some(choice) = &request.tool_choice {
                body["tool_choice"] = choice.to_wire();
            }
        }

        body
    }

    /// Normalize the first choice of a response body.
    fn normalize(response: ApiResponse) -> Result<ChatReply, ProviderError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("No choices in response".into()))?;

        let message = choice.message;
        let mut tool_calls: Vec<ToolCall> = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(ApiToolCall::into_tool_call)
            .collect();

        if tool_calls.is_empty() {
            if let Some(function) = message.function_call {
                tool_calls.push(ToolCall::function(
                    generated_call_id(),
                    function.name,
                    arguments_string(function.arguments),
                ));
            }
        }

        Ok(ChatReply {
            content: message.content,
            tool_calls,
        })
    }
}

#[async_trait]
impl tandem_core::Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatReply, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::request_body(&request);

        debug!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending chat request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(5);
            return Err(ProviderError::RateLimited { retry_after_secs });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("Failed to parse response: {e}")))?;

        Self::normalize(api_response)
    }
}

fn generated_call_id() -> String {
    format!("call_{}", uuid::Uuid::new_v4().simple())
}

/// Arguments arrive as a JSON string from compliant endpoints, but some
/// servers send the object itself.
fn arguments_string(arguments: serde_json::Value) -> String {
    match arguments {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(default)]
    function_call: Option<ApiFunction>,
}

#[derive(Debug, Deserialize)]
struct ApiToolCall {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    function: ApiFunction,
}

impl ApiToolCall {
    fn into_tool_call(self) -> ToolCall {
        let mut call = ToolCall::function(
            self.id.filter(|id| !id.is_empty()).unwrap_or_else(generated_call_id),
            self.function.name,
            arguments_string(self.function.arguments),
        );
        if let Some(kind) = self.kind {
            call.kind = kind;
        }
        call
    }
}

#[derive(Debug, Deserialize)]
struct ApiFunction {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}
