use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::agent::LLMConfig;

pub const DEFAULT_ITERATION_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotificationSinkKind {
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "stdout")]
    Stdout,
}

impl Default for NotificationSinkKind {
    fn default() -> Self {
        NotificationSinkKind::Email
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub grafana: GrafanaConfig,
    pub github: GithubConfig,
    pub web_search: WebSearchConfig,
    pub workflow: WorkflowConfig,
    pub notification: NotificationConfig,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrafanaConfig {
    /// Grafana base URL, or the Prometheus URL when no datasource uid is set.
    pub url: String,
    pub api_key: String,
    /// Prometheus datasource queried through Grafana's datasource proxy.
    pub datasource_uid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    pub token: String,
    pub repo_owner: String,
    pub repo_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchConfig {
    pub tavily_api_key: String,
    pub max_results: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Upper bound on routing decisions per investigation.
    pub iteration_limit: u32,
    /// Tool-calling depth allowed to a single agent invocation.
    pub agent_max_turns: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub sink: NotificationSinkKind,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub recipients: Vec<String>,
    pub queue_size: usize,
}

impl GrafanaConfig {
    /// Without a datasource uid, PromQL goes straight to `url` as a Prometheus API.
    pub fn queries_prometheus_directly(&self) -> bool {
        self.datasource_uid.is_none()
    }
}

impl NotificationConfig {
    pub fn smtp_configured(&self) -> bool {
        !self.smtp_server.is_empty()
            && !self.smtp_username.is_empty()
            && !self.smtp_password.is_empty()
    }
}

impl Config {
    pub fn load() -> crate::Result<Self> {
        // Load environment variables from .env file if it exists
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let provider = var("LLM_PROVIDER", "openai").to_lowercase();
        if !matches!(provider.as_str(), "openai" | "anthropic" | "claude" | "mock") {
            return Err(crate::Error::Config(format!(
                "Unsupported LLM_PROVIDER '{}'. Expected openai, anthropic or mock",
                provider
            )));
        }

        let api_key = lookup("LLM_API_KEY")
            .or_else(|| match provider.as_str() {
                "anthropic" | "claude" => lookup("ANTHROPIC_API_KEY"),
                _ => lookup("OPENAI_API_KEY"),
            })
            .filter(|k| !k.is_empty());

        let config = Config {
            server: ServerConfig {
                addr: var("SERVER_ADDR", "0.0.0.0:8000"),
            },
            llm: LLMConfig {
                provider,
                model: var("LLM_MODEL", "gpt-4o-mini"),
                api_key,
                temperature: parse_optional(&lookup, "LLM_TEMPERATURE")?,
                max_tokens: Some(parse_or(&lookup, "LLM_MAX_TOKENS", 4096)?),
                timeout_seconds: Some(parse_or(&lookup, "LLM_TIMEOUT_SECONDS", 300)?),
            },
            grafana: GrafanaConfig {
                url: var("GRAFANA_URL", "http://localhost:3000"),
                api_key: var("GRAFANA_API_KEY", ""),
                datasource_uid: lookup("GRAFANA_DATASOURCE_UID").filter(|v| !v.is_empty()),
            },
            github: GithubConfig {
                token: var("GITHUB_TOKEN", ""),
                repo_owner: var("GITHUB_REPO_OWNER", ""),
                repo_name: var("GITHUB_REPO_NAME", ""),
            },
            web_search: WebSearchConfig {
                tavily_api_key: var("TAVILY_API_KEY", ""),
                max_results: parse_or(&lookup, "WEB_SEARCH_MAX_RESULTS", 10)?,
            },
            workflow: WorkflowConfig {
                iteration_limit: parse_or(&lookup, "ITERATION_LIMIT", DEFAULT_ITERATION_LIMIT)?,
                agent_max_turns: parse_or(&lookup, "AGENT_MAX_TURNS", 10)?,
            },
            notification: NotificationConfig {
                sink: match var("NOTIFICATION_SINK", "email").to_lowercase().as_str() {
                    "email" => NotificationSinkKind::Email,
                    "stdout" => NotificationSinkKind::Stdout,
                    other => {
                        return Err(crate::Error::Config(format!(
                            "Unsupported NOTIFICATION_SINK '{}'. Expected email or stdout",
                            other
                        )))
                    }
                },
                smtp_server: var("SMTP_SERVER", ""),
                smtp_port: parse_or(&lookup, "SMTP_PORT", 587)?,
                smtp_username: var("SMTP_USERNAME", ""),
                smtp_password: var("SMTP_PASSWORD", ""),
                recipients: var("ALERT_RECIPIENTS", "")
                    .split(',')
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .collect(),
                queue_size: parse_or(&lookup, "NOTIFICATION_QUEUE_SIZE", 64)?,
            },
            log_level: var("LOG_LEVEL", "info").to_lowercase(),
        };

        if config.workflow.iteration_limit == 0 {
            return Err(crate::Error::Config(
                "ITERATION_LIMIT must be at least 1".to_string(),
            ));
        }
        if config.notification.queue_size == 0 {
            return Err(crate::Error::Config(
                "NOTIFICATION_QUEUE_SIZE must be at least 1".to_string(),
            ));
        }

        if config.llm.api_key.is_none() && config.llm.provider != "mock" {
            tracing::warn!("LLM_API_KEY is not set. Investigations will fail until a key is provided.");
        }
        if config.grafana.queries_prometheus_directly() {
            tracing::warn!(
                "GRAFANA_DATASOURCE_UID is not set. PromQL queries go to {}/api/v1 directly, \
                 so GRAFANA_URL must point at Prometheus.",
                config.grafana.url.trim_end_matches('/')
            );
        }
        if config.notification.sink == NotificationSinkKind::Email
            && !config.notification.smtp_configured()
        {
            tracing::warn!("SMTP settings not configured. Email notifications will be skipped.");
        }

        Ok(config)
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> crate::Result<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_optional(lookup, key)?.unwrap_or(default))
}

fn parse_optional<T, F>(lookup: &F, key: &str) -> crate::Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| crate::Error::Config(format!("{} has an invalid value: '{}'", key, raw))),
        None => Ok(None),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                addr: "0.0.0.0:8000".to_string(),
            },
            llm: LLMConfig::default(),
            grafana: GrafanaConfig {
                url: "http://localhost:3000".to_string(),
                api_key: String::new(),
                datasource_uid: None,
            },
            github: GithubConfig {
                token: String::new(),
                repo_owner: String::new(),
                repo_name: String::new(),
            },
            web_search: WebSearchConfig {
                tavily_api_key: String::new(),
                max_results: 10,
            },
            workflow: WorkflowConfig {
                iteration_limit: DEFAULT_ITERATION_LIMIT,
                agent_max_turns: 10,
            },
            notification: NotificationConfig {
                sink: NotificationSinkKind::Email,
                smtp_server: String::new(),
                smtp_port: 587,
                smtp_username: String::new(),
                smtp_password: String::new(),
                recipients: Vec::new(),
                queue_size: 64,
            },
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> crate::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server.addr, "0.0.0.0:8000");
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.workflow.iteration_limit, 10);
        assert_eq!(config.notification.smtp_port, 587);
        assert_eq!(config.notification.sink, NotificationSinkKind::Email);
        assert!(config.notification.recipients.is_empty());
        assert!(!config.notification.smtp_configured());
    }

    #[test]
    fn test_iteration_limit_is_tunable() {
        let config = load(&[("ITERATION_LIMIT", "4")]).unwrap();
        assert_eq!(config.workflow.iteration_limit, 4);

        assert!(load(&[("ITERATION_LIMIT", "0")]).is_err());
        assert!(load(&[("ITERATION_LIMIT", "many")]).is_err());
    }

    #[test]
    fn test_api_key_falls_back_to_provider_variable() {
        let config = load(&[("OPENAI_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));

        let config = load(&[
            ("LLM_PROVIDER", "anthropic"),
            ("OPENAI_API_KEY", "sk-test"),
            ("ANTHROPIC_API_KEY", "ant-test"),
        ])
        .unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("ant-test"));

        let config = load(&[("LLM_API_KEY", "explicit"), ("OPENAI_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("explicit"));
    }

    #[test]
    fn test_recipients_are_split_and_trimmed() {
        let config = load(&[("ALERT_RECIPIENTS", "ops@example.com, sre@example.com ,,")]).unwrap();
        assert_eq!(
            config.notification.recipients,
            vec!["ops@example.com".to_string(), "sre@example.com".to_string()]
        );
    }

    #[test]
    fn test_unknown_provider_and_sink_are_rejected() {
        assert!(load(&[("LLM_PROVIDER", "llama")]).is_err());
        assert!(load(&[("NOTIFICATION_SINK", "slack")]).is_err());
        let config = load(&[("NOTIFICATION_SINK", "STDOUT")]).unwrap();
        assert_eq!(config.notification.sink, NotificationSinkKind::Stdout);
    }

    #[test]
    fn test_datasource_uid_selects_grafana_proxy() {
        let config = load(&[]).unwrap();
        assert!(config.grafana.queries_prometheus_directly());

        let config = load(&[
            ("GRAFANA_URL", "http://grafana:3000"),
            ("GRAFANA_DATASOURCE_UID", "prom-uid"),
        ])
        .unwrap();
        assert!(!config.grafana.queries_prometheus_directly());
        assert_eq!(config.grafana.datasource_uid.as_deref(), Some("prom-uid"));
    }

    #[test]
    fn test_smtp_configured() {
        let config = load(&[
            ("SMTP_SERVER", "smtp.example.com"),
            ("SMTP_USERNAME", "bot@example.com"),
            ("SMTP_PASSWORD", "secret"),
        ])
        .unwrap();
        assert!(config.notification.smtp_configured());
    }
}
