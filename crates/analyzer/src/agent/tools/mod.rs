//! Agent Tools Module
//!
//! Evidence sources the investigation agents can call: metrics, source control and web search.

pub mod github;
pub mod promql;
pub mod web_search;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use github::{GithubAction, GithubArgs, GithubTool};
pub use promql::{PromQLArgs, PromQLTool};
pub use web_search::{WebSearchArgs, WebSearchTool};

/// Result from tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl ToolResult {
    pub fn ok(output: String) -> Self {
        Self {
            success: true,
            output,
            error: None,
            metadata: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error.into()),
            metadata: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Tool bound to an agent at construction time
#[derive(Clone)]
pub enum ToolType {
    Metrics(PromQLTool),
    SourceControl(GithubTool),
    WebSearch(WebSearchTool),
}

impl ToolType {
    pub fn name(&self) -> &'static str {
        match self {
            ToolType::Metrics(_) => promql::NAME,
            ToolType::SourceControl(_) => github::NAME,
            ToolType::WebSearch(_) => web_search::NAME,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolType::Metrics(_) => promql::DESCRIPTION,
            ToolType::SourceControl(_) => github::DESCRIPTION,
            ToolType::WebSearch(_) => web_search::DESCRIPTION,
        }
    }
}

impl From<PromQLTool> for ToolType {
    fn from(tool: PromQLTool) -> Self {
        ToolType::Metrics(tool)
    }
}

impl From<GithubTool> for ToolType {
    fn from(tool: GithubTool) -> Self {
        ToolType::SourceControl(tool)
    }
}

impl From<WebSearchTool> for ToolType {
    fn from(tool: WebSearchTool) -> Self {
        ToolType::WebSearch(tool)
    }
}
