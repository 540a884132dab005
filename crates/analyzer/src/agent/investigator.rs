//! Investigator Agent Implementation
//!
//! Tool-calling agents that gather evidence for the supervisor.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use super::{
    behavior::AgentBehavior,
    message::{ParticipantId, Transcript},
    provider::{CompletionSettings, LLMProviderType},
    templates,
    tools::{GithubTool, PromQLTool, ToolType, WebSearchTool},
};

/// An investigation agent backed by an LLM and a fixed tool set
pub struct ToolAgent {
    id: ParticipantId,
    preamble: String,
    tools: Vec<ToolType>,
    provider: Arc<LLMProviderType>,
    settings: CompletionSettings,
}

impl ToolAgent {
    pub fn new(
        id: ParticipantId,
        preamble: String,
        tools: Vec<ToolType>,
        provider: Arc<LLMProviderType>,
        settings: CompletionSettings,
    ) -> Self {
        Self {
            id,
            preamble,
            tools,
            provider,
            settings,
        }
    }

    pub fn metrics_agent(
        tool: PromQLTool,
        provider: Arc<LLMProviderType>,
        settings: CompletionSettings,
    ) -> Self {
        Self::new(
            ParticipantId::MetricsAgent,
            templates::metrics_preamble(),
            vec![tool.into()],
            provider,
            settings,
        )
    }

    pub fn source_control_agent(
        tool: GithubTool,
        owner: &str,
        repo: &str,
        provider: Arc<LLMProviderType>,
        settings: CompletionSettings,
    ) -> Self {
        Self::new(
            ParticipantId::SourceControlAgent,
            templates::source_control_preamble(owner, repo, Utc::now()),
            vec![tool.into()],
            provider,
            settings,
        )
    }

    pub fn web_search_agent(
        tool: WebSearchTool,
        provider: Arc<LLMProviderType>,
        settings: CompletionSettings,
    ) -> Self {
        Self::new(
            ParticipantId::WebSearchAgent,
            templates::web_search_preamble(),
            vec![tool.into()],
            provider,
            settings,
        )
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    fn build_prompt(transcript: &Transcript, instruction: Option<&str>) -> String {
        let mut prompt = transcript.render();
        if let Some(instruction) = instruction.filter(|i| !i.trim().is_empty()) {
            prompt.push_str("\n\nInstruction from the supervisor: ");
            prompt.push_str(instruction.trim());
        }
        prompt
    }
}

#[async_trait]
impl AgentBehavior for ToolAgent {
    fn participant(&self) -> ParticipantId {
        self.id
    }

    async fn respond(&self, transcript: &Transcript, instruction: Option<&str>) -> Result<String> {
        let prompt = Self::build_prompt(transcript, instruction);
        debug!(
            participant = %self.id,
            tools = ?self.tool_names(),
            "Prompting investigator"
        );

        let response = self
            .provider
            .complete(&self.settings, &self.preamble, &prompt, &self.tools)
            .await?;

        if response.trim().is_empty() {
            return Err(anyhow::anyhow!("model returned an empty reply"));
        }

        Ok(response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::provider::LLMConfig;

    fn mock_agent() -> ToolAgent {
        let config = LLMConfig {
            provider: "mock".to_string(),
            ..Default::default()
        };
        let tool = PromQLTool::new("http://prometheus:9090").unwrap();
        ToolAgent::metrics_agent(
            tool,
            Arc::new(LLMProviderType::Mock),
            CompletionSettings::from_config(&config, 3),
        )
    }

    #[test]
    fn test_prompt_carries_instruction() {
        let transcript = Transcript::with_alert("CPU usage > 90% on node-1");
        let prompt = ToolAgent::build_prompt(&transcript, Some("  query node CPU  "));
        assert!(prompt.starts_with("[Alert]\nCPU usage > 90% on node-1"));
        assert!(prompt.ends_with("Instruction from the supervisor: query node CPU"));

        let prompt = ToolAgent::build_prompt(&transcript, Some(" "));
        assert!(!prompt.contains("Instruction"));
    }

    #[tokio::test]
    async fn test_metrics_agent_replies_as_itself() {
        let agent = mock_agent();
        assert_eq!(agent.tool_names(), vec!["promql"]);

        let transcript = Transcript::with_alert("CPU usage > 90% on node-1");
        let message = agent.invoke(&transcript, Some("check CPU")).await;
        assert_eq!(message.author, Some(ParticipantId::MetricsAgent));
        assert!(message.content.contains("CPU usage > 90% on node-1"));
    }
}
