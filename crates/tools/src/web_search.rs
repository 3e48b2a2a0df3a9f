//! Web search tool over a pluggable search engine.
//!
//! The tool itself never fails on engine errors: it answers with the
//! [`SEARCH_FAILED`] sentinel so the model can plan around a dead engine.
//! Bad arguments are still an error.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tandem_core::error::ToolError;
use tandem_core::tool::Tool;
use tracing::{debug, warn};

/// Returned in place of results when the engine errors.
pub const SEARCH_FAILED: &str = "Search failed";

const DEFAULT_MAX_RESULTS: u64 = 5;

/// One search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    #[serde(alias = "url")]
    pub href: String,
    #[serde(alias = "description", alias = "snippet")]
    pub body: String,
}

/// A text search backend (DuckDuckGo, Brave, a local index...).
#[async_trait]
pub trait SearchEngine: Send + Sync {
    async fn search(&self, text: &str, max_results: usize) -> Result<Vec<SearchHit>, ToolError>;
}

pub struct WebSearchTool {
    engine: Arc<dyn SearchEngine>,
}

impl WebSearchTool {
    pub fn new(engine: Arc<dyn SearchEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for the given text. Returns a list of results with title, href and body."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "The search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return",
                    "default": DEFAULT_MAX_RESULTS
                }
            },
            "required": ["text"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let text = arguments["text"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'text' argument".into()))?;

        let max_results = match &arguments["max_results"] {
            serde_json::Value::Null => DEFAULT_MAX_RESULTS,
            v => v.as_u64().ok_or_else(|| {
                ToolError::InvalidArguments("'max_results' must be a non-negative integer".into())
            })?,
        };
        let max_results = max_results as usize;

        match self.engine.search(text, max_results).await {
            Ok(mut hits) => {
                hits.truncate(max_results);
                debug!(query = %text, hits = hits.len(), "Web search completed");
                serde_json::to_value(hits)
                    .map_err(|e| ToolError::ExecutionFailed {
                        tool_name: self.name().to_string(),
                        reason: e.to_string(),
                    })
            }
            Err(e) => {
                warn!(query = %text, error = %e, "Web search failed");
                Ok(serde_json::Value::String(SEARCH_FAILED.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEngine(Vec<SearchHit>);

    #[async_trait]
    impl SearchEngine for FixedEngine {
        async fn search(&self, _text: &str, _max: usize) -> Result<Vec<SearchHit>, ToolError> {
            Ok(self.0.clone())
        }
    }

    struct DownEngine;

    #[async_trait]
    impl SearchEngine for DownEngine {
        async fn search(&self, _text: &str, _max: usize) -> Result<Vec<SearchHit>, ToolError> {
            Err(ToolError::ExecutionFailed {
                tool_name: "web_search".into(),
                reason: "rate limited".into(),
            })
        }
    }

    fn hit(n: usize) -> SearchHit {
        SearchHit {
            title: format!("Result {n}"),
            href: format!("https://example.com/{n}"),
            body: format!("Body {n}"),
        }
    }

    #[tokio::test]
    async fn returns_hits_capped_at_max_results() {
        let tool = WebSearchTool::new(Arc::new(FixedEngine((0..4).map(hit).collect())));
        let out = tool
            .execute(serde_json::json!({"text": "rust", "max_results": 2}))
            .await
            .unwrap();

        let arr = out.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["title"], "Result 0");
        assert_eq!(arr[1]["href"], "https://example.com/1");
        assert_eq!(arr[1]["body"], "Body 1");
    }

    #[tokio::test]
    async fn engine_failure_yields_sentinel() {
        let tool = WebSearchTool::new(Arc::new(DownEngine));
        let out = tool.execute(serde_json::json!({"text": "rust"})).await.unwrap();
        assert_eq!(out, serde_json::json!("Search failed"));
    }

    #[tokio::test]
    async fn missing_text_is_invalid() {
        let tool = WebSearchTool::new(Arc::new(FixedEngine(vec![])));
        let err = tool.execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn hit_accepts_engine_field_aliases() {
        let hit: SearchHit = serde_json::from_str(
            r#"{"title":"T","url":"https://x","description":"D"}"#,
        )
        .unwrap();
        assert_eq!(hit.href, "https://x");
        assert_eq!(hit.body, "D");
    }

    #[test]
    fn registry_exposes_schema() {
        let registry = crate::registry_with(Arc::new(FixedEngine(vec![])));
        let defs = registry.definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0]["function"]["name"], "web_search");
        assert_eq!(defs[0]["function"]["parameters"]["required"][0], "text");
    }
}
