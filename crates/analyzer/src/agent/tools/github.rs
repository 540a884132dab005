//! GitHub Tool for Source-Control Queries
//!
//! Searches issues, pull requests, commits and code of the one configured repository.

use super::{ToolError, ToolResult};
use anyhow::Result;
use reqwest::Client;
use rig::completion::ToolDefinition;
use rig::tool::Tool as RigTool;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const NAME: &str = "github";
pub const DESCRIPTION: &str = "Search the configured GitHub repository. Actions: 'issues' and \
     'pull_requests' (search by text), 'commits' (recent commits, optionally filtered by text), \
     'code' (search file contents, query required).";

const DEFAULT_API_BASE: &str = "https://api.github.com";
const MAX_LIMIT: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GithubAction {
    Issues,
    PullRequests,
    Commits,
    Code,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GithubArgs {
    pub action: GithubAction,
    pub query: Option<String>,
    pub limit: Option<u32>,
}

/// GitHub tool scoped to a single repository
#[derive(Clone)]
pub struct GithubTool {
    client: Client,
    api_base: String,
    token: String,
    owner: String,
    repo: String,
    timeout: Duration,
}

impl GithubTool {
    pub fn new(token: String, owner: String, repo: String) -> Self {
        Self {
            client: Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            token,
            owner,
            repo,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn repository(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Build the request path and query parameters for an action
    fn request_for(&self, args: &GithubArgs) -> (String, Vec<(String, String)>) {
        let limit = args.limit.unwrap_or(10).clamp(1, MAX_LIMIT).to_string();
        let text = args.query.as_deref().map(str::trim).unwrap_or("");
        let repo = format!("repo:{}", self.repository());
        let scoped = |qualifier: &str| {
            [repo.as_str(), qualifier, text]
                .iter()
                .filter(|part| !part.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join(" ")
        };

        match args.action {
            GithubAction::Issues => (
                "/search/issues".to_string(),
                vec![
                    ("q".to_string(), scoped("is:issue")),
                    ("sort".to_string(), "updated".to_string()),
                    ("per_page".to_string(), limit),
                ],
            ),
            GithubAction::PullRequests => (
                "/search/issues".to_string(),
                vec![
                    ("q".to_string(), scoped("is:pr")),
                    ("sort".to_string(), "updated".to_string()),
                    ("per_page".to_string(), limit),
                ],
            ),
            GithubAction::Commits if !text.is_empty() => (
                "/search/commits".to_string(),
                vec![
                    ("q".to_string(), scoped("")),
                    ("sort".to_string(), "committer-date".to_string()),
                    ("per_page".to_string(), limit),
                ],
            ),
            GithubAction::Commits => (
                format!("/repos/{}/commits", self.repository()),
                vec![("per_page".to_string(), limit)],
            ),
            GithubAction::Code => (
                "/search/code".to_string(),
                vec![("q".to_string(), scoped("")), ("per_page".to_string(), limit)],
            ),
        }
    }

    async fn execute(&self, args: GithubArgs) -> ToolResult {
        let (path, params) = self.request_for(&args);

        match self.fetch(&path, &params).await {
            Ok(body) => ToolResult {
                success: true,
                output: format_github_response(args.action, &body),
                error: None,
                metadata: None,
            },
            Err(e) => ToolResult::failed(e.to_string()),
        }
    }

    async fn fetch(&self, path: &str, params: &[(String, String)]) -> Result<Value> {
        let mut request = self
            .client
            .get(format!("{}{}", self.api_base, path))
            .query(params)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "alert-analyzer")
            .timeout(self.timeout);

        if !self.token.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", self.token));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow::anyhow!("GitHub request failed ({}): {}", status, error_text));
        }

        Ok(response.json().await?)
    }

    fn validate(&self, args: &GithubArgs) -> Result<()> {
        if self.owner.is_empty() || self.repo.is_empty() {
            return Err(anyhow::anyhow!(
                "No repository configured (set GITHUB_REPO_OWNER and GITHUB_REPO_NAME)"
            ));
        }

        let has_query = args.query.as_deref().map_or(false, |q| !q.trim().is_empty());
        if args.action == GithubAction::Code && !has_query {
            return Err(anyhow::anyhow!("Code search requires a query"));
        }

        Ok(())
    }
}

impl RigTool for GithubTool {
    const NAME: &'static str = NAME;

    type Error = ToolError;
    type Args = GithubArgs;
    type Output = ToolResult;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: format!("{} Repository: {}", DESCRIPTION, self.repository()),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "enum": ["issues", "pull_requests", "commits", "code"],
                        "description": "What to search"
                    },
                    "query": {
                        "type": "string",
                        "description": "Search text (e.g., 'cpu spike' or 'worker pool')"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of results (1-30, default 10)"
                    }
                },
                "required": ["action"]
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

fn format_github_response(action: GithubAction, body: &Value) -> String {
    let items: Vec<&Value> = match body {
        Value::Array(items) => items.iter().collect(),
        other => other
            .get("items")
            .and_then(|v| v.as_array())
            .map(|items| items.iter().collect())
            .unwrap_or_default(),
    };

    if items.is_empty() {
        return "No results found".to_string();
    }

    let str_field = |item: &Value, pointer: &str| -> String {
        item.pointer(pointer)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    };

    items
        .iter()
        .map(|item| match action {
            GithubAction::Issues | GithubAction::PullRequests => format!(
                "#{} {} [{}] {}\n  updated {}",
                item.get("number").and_then(|v| v.as_u64()).unwrap_or_default(),
                str_field(item, "/title"),
                str_field(item, "/state"),
                str_field(item, "/html_url"),
                str_field(item, "/updated_at"),
            ),
            GithubAction::Commits => {
                let sha = str_field(item, "/sha");
                let message = str_field(item, "/commit/message");
                format!(
                    "{} {} ({} at {}) {}",
                    sha.chars().take(7).collect::<String>(),
                    message.lines().next().unwrap_or(""),
                    str_field(item, "/commit/author/name"),
                    str_field(item, "/commit/author/date"),
                    str_field(item, "/html_url"),
                )
            }
            GithubAction::Code => format!(
                "{} {}",
                str_field(item, "/path"),
                str_field(item, "/html_url"),
            ),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
