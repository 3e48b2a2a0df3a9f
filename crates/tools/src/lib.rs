//! Tool adapters for Tandem.
//!
//! Tools give the executor a way to reach outside the model. The only
//! built-in tool is web search, which delegates to a pluggable
//! [`SearchEngine`](web_search::SearchEngine).

pub mod web_search;

use std::sync::Arc;

use tandem_core::tool::ToolRegistry;

pub use web_search::{SearchEngine, SearchHit, WebSearchTool, SEARCH_FAILED};

/// Create a registry holding the web search tool backed by `engine`.
pub fn registry_with(engine: Arc<dyn SearchEngine>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(WebSearchTool::new(engine)));
    registry
}
