//! Alert Analyzer
//!
//! Runs one investigation per alert and shapes the caller-facing response.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, Instrument};
use uuid::Uuid;

use crate::{
    agent::{
        create_provider, AgentBehavior, CompletionSettings, LlmSummarizer, LlmSupervisor,
        ParticipantId, ToolAgent,
    },
    agent::tools::{GithubTool, PromQLTool, WebSearchTool},
    config::Config,
    report,
    server::models::AnalysisResponse,
    workflow::{CoordinationEngine, Participants},
};

/// Builds a fresh set of participants for every investigation
pub trait ParticipantFactory: Send + Sync {
    fn build(&self) -> Result<Participants>;
}

/// Production factory: LLM-backed supervisor, investigators and summarizer
pub struct LlmParticipantFactory {
    config: Config,
}

impl LlmParticipantFactory {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ParticipantFactory for LlmParticipantFactory {
    fn build(&self) -> Result<Participants> {
        let provider = Arc::new(create_provider(&self.config.llm)?);
        let settings =
            CompletionSettings::from_config(&self.config.llm, self.config.workflow.agent_max_turns);

        let grafana = &self.config.grafana;
        let promql = PromQLTool::for_grafana(&grafana.url, grafana.datasource_uid.as_deref())?
            .with_auth_token(grafana.api_key.clone());

        let github = &self.config.github;
        let github_tool = GithubTool::new(
            github.token.clone(),
            github.repo_owner.clone(),
            github.repo_name.clone(),
        );

        let web_search = WebSearchTool::new(
            self.config.web_search.tavily_api_key.clone(),
            self.config.web_search.max_results,
        );

        let agents: Vec<Arc<dyn AgentBehavior>> = vec![
            Arc::new(ToolAgent::metrics_agent(promql, provider.clone(), settings.clone())),
            Arc::new(ToolAgent::source_control_agent(
                github_tool,
                &github.repo_owner,
                &github.repo_name,
                provider.clone(),
                settings.clone(),
            )),
            Arc::new(ToolAgent::web_search_agent(web_search, provider.clone(), settings.clone())),
        ];

        let members: Vec<ParticipantId> = agents.iter().map(|a| a.participant()).collect();

        // Routing and summarizing are single completions without tools
        let mut single_turn = settings;
        single_turn.max_turns = 1;

        Ok(Participants {
            supervisor: Arc::new(LlmSupervisor::new(
                provider.clone(),
                single_turn.clone(),
                &members,
            )?),
            agents,
            summarizer: Arc::new(LlmSummarizer::new(provider, single_turn)?),
        })
    }
}

pub struct AlertAnalyzer {
    factory: Arc<dyn ParticipantFactory>,
    iteration_limit: u32,
}

impl AlertAnalyzer {
    pub fn new(factory: Arc<dyn ParticipantFactory>, iteration_limit: u32) -> Self {
        Self {
            factory,
            iteration_limit,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(LlmParticipantFactory::new(config.clone())),
            config.workflow.iteration_limit,
        )
    }

    /// Investigate one alert. Setup failures become an error response.
    pub async fn analyze(&self, alert_description: &str) -> AnalysisResponse {
        let id = Uuid::new_v4();
        let span = tracing::info_span!("investigation", id = %id);

        async move {
            info!("Analyzing alert: {}", alert_description);

            let participants = match self.factory.build() {
                Ok(participants) => participants,
                Err(e) => {
                    error!("Failed to set up investigation: {:#}", e);
                    return AnalysisResponse::error(format!("{:#}", e));
                }
            };

            let engine = CoordinationEngine::new(participants, self.iteration_limit);
            let outcome = engine.run(alert_description).await;
            let analysis = report::extract(&outcome.state.transcript);
            let raw_response = outcome
                .state
                .transcript
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();

            info!("Analysis finished ({})", outcome.final_phase);
            AnalysisResponse::success(analysis, raw_response)
        }
        .instrument(span)
        .await
    }
}
