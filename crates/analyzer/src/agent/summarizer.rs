//! Summarizer
//!
//! Condenses a finished investigation into problem, cause and solution.

use anyhow::Result;
use async_trait::async_trait;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::{
    message::Transcript,
    provider::{CompletionSettings, LLMProviderType},
    supervisor::strip_code_fence,
    templates,
};

/// Structured final report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Summary {
    /// Clear description of the alert problem based on the information provided
    pub problem: String,
    /// Root cause analysis based on the investigation findings
    pub cause: String,
    /// Numbered list of specific actionable steps to resolve the issue
    pub solution: String,
}

impl Summary {
    /// Render as the sectioned report appended to the transcript
    pub fn to_report(&self) -> String {
        format!(
            "### Problem\n{}\n\n### Root Cause\n{}\n\n### Solution\n{}",
            self.problem.trim(),
            self.cause.trim(),
            self.solution.trim()
        )
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, transcript: &Transcript) -> Result<Summary>;
}

/// Summarizer backed by an LLM
pub struct LlmSummarizer {
    provider: Arc<LLMProviderType>,
    settings: CompletionSettings,
    preamble: String,
}

impl LlmSummarizer {
    pub fn new(provider: Arc<LLMProviderType>, settings: CompletionSettings) -> Result<Self> {
        let schema = serde_json::to_string_pretty(&schema_for!(Summary))?;
        Ok(Self {
            provider,
            settings,
            preamble: templates::summarizer_preamble(&schema),
        })
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, transcript: &Transcript) -> Result<Summary> {
        let raw = self
            .provider
            .complete(&self.settings, &self.preamble, &transcript.render(), &[])
            .await?;
        debug!("Summarizer raw response: {}", raw);

        serde_json::from_str(strip_code_fence(&raw))
            .map_err(|e| anyhow::anyhow!("Summarizer returned malformed output: {}", e))
    }
}
