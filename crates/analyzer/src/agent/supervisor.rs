//! Supervisor
//!
//! Decides which participant acts next and what it should look at.

use anyhow::Result;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{
    message::{ParticipantId, Transcript},
    provider::{CompletionSettings, LLMProviderType},
    templates,
};

lazy_static! {
    static ref CODE_FENCE: Regex =
        Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("code fence pattern is valid");
}

/// Where control goes after a supervisor turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dispatch(ParticipantId),
    Summarize,
    Done,
}

impl Route {
    /// Parse a routing label. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "SUMMARIZE" => Some(Route::Summarize),
            "FINISH" | "DONE" => Some(Route::Done),
            _ => ParticipantId::from_label(label).map(Route::Dispatch),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub route: Route,
    pub instruction: String,
}

impl Decision {
    pub fn new(route: Route, instruction: impl Into<String>) -> Self {
        Self {
            route,
            instruction: instruction.into(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Supervisor: Send + Sync {
    async fn decide(&self, transcript: &Transcript) -> Result<Decision>;
}

/// Structured answer the supervisor model is asked for
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SupervisorResponse {
    /// The next participant, SUMMARIZE, or FINISH
    pub next: String,
    /// Instructions for the next participant
    #[serde(default)]
    pub instruction: String,
}

/// Supervisor backed by an LLM
pub struct LlmSupervisor {
    provider: Arc<LLMProviderType>,
    settings: CompletionSettings,
    preamble: String,
}

impl LlmSupervisor {
    pub fn new(
        provider: Arc<LLMProviderType>,
        settings: CompletionSettings,
        members: &[ParticipantId],
    ) -> Result<Self> {
        let schema = serde_json::to_string_pretty(&schema_for!(SupervisorResponse))?;
        let labels: Vec<&str> = members.iter().map(|m| m.label()).collect();

        Ok(Self {
            provider,
            settings,
            preamble: templates::supervisor_preamble(&labels, &schema),
        })
    }
}

#[async_trait]
impl Supervisor for LlmSupervisor {
    async fn decide(&self, transcript: &Transcript) -> Result<Decision> {
        let raw = self
            .provider
            .complete(&self.settings, &self.preamble, &transcript.render(), &[])
            .await?;
        debug!("Supervisor raw response: {}", raw);

        parse_decision(&raw)
    }
}

/// Strip an optional markdown code fence around a JSON answer
pub(crate) fn strip_code_fence(raw: &str) -> &str {
    match CODE_FENCE.captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => raw.trim(),
    }
}

/// Turn the model's answer into a decision, normalizing unknown labels to Summarize
pub fn parse_decision(raw: &str) -> Result<Decision> {
    let response: SupervisorResponse = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| anyhow::anyhow!("Supervisor returned malformed output: {}", e))?;

    let route = match Route::from_label(&response.next) {
        Some(route) => route,
        None => {
            warn!(
                "Supervisor chose unknown participant '{}', summarizing instead",
                response.next
            );
            Route::Summarize
        }
    };

    Ok(Decision::new(route, response.instruction))
}
