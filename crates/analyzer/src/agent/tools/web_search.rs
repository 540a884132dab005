//! Web Search Tool
//!
//! Tavily-backed search for public knowledge about an alert.

use super::{ToolError, ToolResult};
use anyhow::Result;
use reqwest::Client;
use rig::completion::ToolDefinition;
use rig::tool::Tool as RigTool;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const NAME: &str = "web_search";
pub const DESCRIPTION: &str = "Search the web for documentation, incident reports and known \
     issues. Returns titles, URLs and content excerpts.";

const DEFAULT_ENDPOINT: &str = "https://api.tavily.com/search";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebSearchArgs {
    pub query: String,
    pub max_results: Option<u32>,
}

#[derive(Clone)]
pub struct WebSearchTool {
    client: Client,
    endpoint: String,
    api_key: String,
    max_results: u32,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
    search_depth: &'a str,
    include_answer: bool,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

impl WebSearchTool {
    pub fn new(api_key: String, max_results: u32) -> Self {
        Self {
            client: Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key,
            max_results: max_results.max(1),
            timeout: Duration::from_secs(30),
        }
    }

    async fn search(&self, args: &WebSearchArgs) -> Result<TavilyResponse> {
        let body = TavilyRequest {
            api_key: &self.api_key,
            query: args.query.trim(),
            max_results: args.max_results.unwrap_or(self.max_results).clamp(1, 20),
            search_depth: "basic",
            include_answer: true,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow::anyhow!("Web search failed ({}): {}", status, error_text));
        }

        Ok(response.json().await?)
    }

    async fn execute(&self, args: WebSearchArgs) -> ToolResult {
        match self.search(&args).await {
            Ok(response) => ToolResult::ok(format_search_response(&response)),
            Err(e) => ToolResult::failed(e.to_string()),
        }
    }

    fn validate(&self, args: &WebSearchArgs) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(anyhow::anyhow!("Web search is not configured (set TAVILY_API_KEY)"));
        }
        if args.query.trim().is_empty() {
            return Err(anyhow::anyhow!("Search query must not be empty"));
        }
        if args.query.len() > 400 {
            return Err(anyhow::anyhow!("Search query too long (max 400 characters)"));
        }
        Ok(())
    }
}

impl RigTool for WebSearchTool {
    const NAME: &'static str = NAME;

    type Error = ToolError;
    type Args = WebSearchArgs;
    type Output = ToolResult;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: DESCRIPTION.to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query (e.g., 'postgres high cpu autovacuum')"
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of results (1-20)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        self.validate(&args)
            .map_err(|e| ToolError::ValidationError(e.to_string()))?;

        let tool = self.clone();
        tokio::spawn(async move { tool.execute(args).await })
            .await
            .map_err(|e| ToolError::InternalError(format!("Task join error: {}", e)))
    }
}

fn format_search_response(response: &TavilyResponse) -> String {
    let mut output = String::new();

    if let Some(answer) = response.answer.as_deref().filter(|a| !a.trim().is_empty()) {
        output.push_str(&format!("Answer: {}\n\n", answer.trim()));
    }

    if response.results.is_empty() {
        output.push_str("No search results found");
        return output;
    }

    for (idx, result) in response.results.iter().enumerate() {
        output.push_str(&format!(
            "{}. {}\n   {}\n   {}\n",
            idx + 1,
            result.title,
            result.url,
            result.content.trim()
        ));
    }

    output
}
