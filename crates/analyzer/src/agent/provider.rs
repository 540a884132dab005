//! LLM Provider Abstraction
//!
//! Provides a unified interface for different LLM providers using Rig.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use rig::completion::Prompt;
use rig::providers::{anthropic, openai};

use super::tools::ToolType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub provider: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            temperature: None,
            max_tokens: Some(4096),
            timeout_seconds: Some(300),
        }
    }
}

/// Per-call model settings shared by every participant built from one config
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub max_turns: usize,
}

impl CompletionSettings {
    pub fn from_config(config: &LLMConfig, max_turns: usize) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens.unwrap_or(4096),
            timeout: Duration::from_secs(config.timeout_seconds.unwrap_or(300)),
            max_turns: max_turns.max(1),
        }
    }
}

/// Provider client selected from configuration
#[derive(Clone)]
pub enum LLMProviderType {
    Anthropic(anthropic::Client),
    OpenAI(openai::Client),
    Mock,
}

/// Build a Rig agent for the given client with tools attached and prompt it.
macro_rules! prompt_with_tools {
    ($client:expr, $settings:expr, $preamble:expr, $prompt:expr, $tools:expr) => {{
        let mut builder = $client
            .agent(&$settings.model)
            .preamble($preamble)
            .max_tokens($settings.max_tokens as u64);

        if let Some(temperature) = $settings.temperature {
            builder = builder.temperature(temperature as f64);
        }

        for tool in $tools {
            builder = match tool {
                ToolType::Metrics(t) => builder.tool(t.clone()),
                ToolType::SourceControl(t) => builder.tool(t.clone()),
                ToolType::WebSearch(t) => builder.tool(t.clone()),
            };
            debug!("Added tool: {}", tool.name());
        }

        let agent = builder.build();
        agent.prompt($prompt).multi_turn($settings.max_turns).await
    }};
}

impl LLMProviderType {
    pub fn name(&self) -> &'static str {
        match self {
            LLMProviderType::Anthropic(_) => "anthropic",
            LLMProviderType::OpenAI(_) => "openai",
            LLMProviderType::Mock => "mock",
        }
    }

    /// Run one agent completion, letting the model call the supplied tools.
    pub async fn complete(
        &self,
        settings: &CompletionSettings,
        preamble: &str,
        prompt: &str,
        tools: &[ToolType],
    ) -> Result<String> {
        let call = async {
            match self {
                LLMProviderType::Anthropic(client) => {
                    prompt_with_tools!(client, settings, preamble, prompt, tools)
                        .map_err(|e| anyhow::anyhow!("Anthropic API error: {}", e))
                }
                LLMProviderType::OpenAI(client) => {
                    prompt_with_tools!(client, settings, preamble, prompt, tools)
                        .map_err(|e| anyhow::anyhow!("OpenAI API error: {}", e))
                }
                LLMProviderType::Mock => Ok(MockProvider::respond(preamble, prompt)),
            }
        };

        tokio::time::timeout(settings.timeout, call)
            .await
            .map_err(|_| {
                anyhow::anyhow!(
                    "{} completion timed out after {}s",
                    self.name(),
                    settings.timeout.as_secs()
                )
            })?
    }
}

/// Deterministic stand-in for a model, used for local runs and tests
pub struct MockProvider;

impl MockProvider {
    pub fn respond(preamble: &str, prompt: &str) -> String {
        if preamble.contains("who should act next") {
            // Route to metrics once, then wrap up
            if prompt.contains("[MetricsAgent]") {
                r#"{"next": "SUMMARIZE", "instruction": "Summarize the metrics findings."}"#
                    .to_string()
            } else {
                r#"{"next": "MetricsAgent", "instruction": "Check CPU and memory usage around the alert time."}"#
                    .to_string()
            }
        } else if preamble.contains("final report") {
            serde_json::json!({
                "problem": "Mock investigation of the reported alert.",
                "cause": "The mock metrics agent observed sustained load above the alert threshold.",
                "solution": "1. Review recent deployments\n2. Scale the affected service"
            })
            .to_string()
        } else {
            format!(
                "Mock finding: metrics show sustained load while investigating '{}'.",
                prompt.lines().nth(1).unwrap_or("the alert").chars().take(80).collect::<String>()
            )
        }
    }
}

/// Create a provider from configuration.
///
/// The key must already be resolved into `config.api_key`; `Config::load` falls back to
/// `OPENAI_API_KEY` / `ANTHROPIC_API_KEY` there.
pub fn create_provider(config: &LLMConfig) -> Result<LLMProviderType> {
    let api_key = || {
        config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("{} API key is not set (LLM_API_KEY)", config.provider)
            })
    };

    match config.provider.as_str() {
        "anthropic" | "claude" => Ok(LLMProviderType::Anthropic(anthropic::Client::new(
            api_key()?,
            "https://api.anthropic.com",
            None,
            anthropic::ANTHROPIC_VERSION_LATEST,
        ))),
        "openai" => Ok(LLMProviderType::OpenAI(openai::Client::new(api_key()?))),
        "mock" => Ok(LLMProviderType::Mock),
        other => Err(anyhow::anyhow!("Unsupported LLM provider: {}", other)),
    }
}
