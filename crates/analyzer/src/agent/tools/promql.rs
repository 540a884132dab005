//! PromQL Tool for Metrics Queries
//!
//! Lets the metrics agent query Prometheus, directly or through Grafana's datasource proxy.

use super::{ToolError, ToolResult};
use anyhow::Result;
use reqwest::Client;
use rig::completion::ToolDefinition;
use rig::tool::Tool as RigTool;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const NAME: &str = "promql";
pub const DESCRIPTION: &str = "Query metrics with PromQL. Supports instant queries like \
     'rate(http_requests_total[5m])' and range queries when start and end are given \
     (RFC 3339 or unix timestamps). Returns metric values and labels.";

/// PromQL tool for querying Prometheus
#[derive(Clone)]
pub struct PromQLTool {
    base_url: Url,
    client: Client,
    auth_token: Option<String>,
    timeout: Duration,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PromQLArgs {
    pub query: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub step: Option<String>,
}

impl PromQLTool {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("Invalid metrics endpoint '{}': {}", base_url, e))?;

        Ok(Self {
            base_url,
            client: Client::new(),
            auth_token: None,
            timeout: Duration::from_secs(30),
        })
    }

    /// Query through a Grafana datasource proxy instead of Prometheus directly
    pub fn for_grafana(grafana_url: &str, datasource_uid: Option<&str>) -> Result<Self> {
        match datasource_uid {
            Some(uid) => Self::new(&format!(
                "{}/api/datasources/proxy/uid/{}",
                grafana_url.trim_end_matches('/'),
                uid
            )),
            None => Self::new(grafana_url),
        }
    }

    /// Set authentication token
    pub fn with_auth_token(mut self, token: String) -> Self {
        if !token.is_empty() {
            self.auth_token = Some(token);
        }
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    async fn send(&self, path: &str, params: &[(&str, &str)]) -> Result<PrometheusResponse> {
        let mut request = self
            .client
            .get(self.endpoint(path))
            .query(params)
            .timeout(self.timeout);

        if let Some(token) = &self.auth_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow::anyhow!("Prometheus query failed ({}): {}", status, error_text));
        }

        Ok(response.json().await?)
    }

    async fn execute(&self, args: PromQLArgs) -> ToolResult {
        let result = match (&args.start, &args.end) {
            (Some(start), Some(end)) => {
                let step = args.step.as_deref().unwrap_or("60s");
                self.send(
                    "api/v1/query_range",
                    &[
                        ("query", args.query.as_str()),
                        ("start", start.as_str()),
                        ("end", end.as_str()),
                        ("step", step),
                    ],
                )
                .await
            }
            _ => self.send("api/v1/query", &[("query", args.query.as_str())]).await,
        };

        match result {
            Ok(response) => ToolResult {
                success: true,
                output: format_prometheus_response(&response),
                error: None,
                metadata: serde_json::to_value(&response).ok(),
            },
            Err(e) => ToolResult::failed(e.to_string()),
        }
    }

    fn validate(&self, args: &PromQLArgs) -> Result<()> {
        if args.query.trim().is_empty() {
            return Err(anyhow::anyhow!("PromQL query must not be empty"));
        }

        // Basic validation - check for common injection attempts
        if args.query.contains(';') || args.query.contains("&&") || args.query.contains("||") {
            return Err(anyhow::anyhow!("Invalid characters in PromQL query"));
        }

        if args.query.len() > 1000 {
            return Err(anyhow::anyhow!("Query too long (max 1000 characters)"));
        }

        if args.start.is_some() != args.end.is_some() {
            return Err(anyhow::anyhow!("Range queries need both start and end"));
        }

        Ok(())
    }
}

impl RigTool for PromQLTool {
    const NAME: &'static str = NAME;

    type Error = ToolError;
    type Args = PromQLArgs;
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
                        "description": "The PromQL expression (e.g., 'avg(rate(node_cpu_seconds_total{mode!=\"idle\"}[5m]))')"
                    },
                    "start": {
                        "type": "string",
                        "description": "Range start, RFC 3339 or unix timestamp. Omit for an instant query."
                    },
                    "end": {
                        "type": "string",
                        "description": "Range end, RFC 3339 or unix timestamp. Omit for an instant query."
                    },
                    "step": {
                        "type": "string",
                        "description": "Range resolution (e.g., '60s'). Defaults to 60s."
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        self.validate(&args)
            .map_err(|e| ToolError::ValidationError(e.to_string()))?;

        // Spawn the request so the returned future stays Sync
        let tool = self.clone();
        tokio::spawn(async move { tool.execute(args).await })
            .await
            .map_err(|e| ToolError::InternalError(format!("Task join error: {}", e)))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PrometheusResponse {
    status: String,
    data: PrometheusData,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PrometheusData {
    #[serde(rename = "resultType")]
    result_type: String,
    result: Vec<PrometheusResult>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PrometheusResult {
    #[serde(default)]
    metric: serde_json::Value,
    value: Option<(f64, String)>,
    values: Option<Vec<(f64, String)>>,
}

/// Format Prometheus response for human-readable output
fn format_prometheus_response(response: &PrometheusResponse) -> String {
    let mut output = String::new();

    if response.data.result.is_empty() {
        return "No data found for the query".to_string();
    }

    for result in &response.data.result {
        if let Some(metric_obj) = result.metric.as_object() {
            if !metric_obj.is_empty() {
                let labels: Vec<String> = metric_obj
                    .iter()
                    .map(|(k, v)| format!("{}=\"{}\"", k, v.as_str().unwrap_or("")))
                    .collect();
                output.push_str(&format!("Metric: {{{}}}\n", labels.join(", ")));
            }
        }

        if let Some((timestamp, value)) = &result.value {
            output.push_str(&format!("Value: {} @ {}\n", value, timestamp));
        }

        if let Some(values) = &result.values {
            output.push_str("Values:\n");
            for (timestamp, value) in values {
                output.push_str(&format!("  {} @ {}\n", value, timestamp));
            }
        }

        output.push('\n');
    }

    if let Some(warnings) = &response.warnings {
        for warning in warnings {
            output.push_str(&format!("Warning: {}\n", warning));
        }
    }

    output
}
