use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    agent::{AgentBehavior, Message, ParticipantId, Route, Summarizer, Supervisor},
    metrics,
    workflow::{EnginePhase, InvestigationState, Next},
};

const FINAL_REPORT_INSTRUCTION: &str = "The investigation is over. Produce the final report \
     from the findings above: the problem, its root cause, and a numbered list of solution steps.";

const FORCED_SUMMARY_INSTRUCTION: &str =
    "Iteration limit reached. Summarize the findings gathered so far.";

/// Everything one investigation talks to
pub struct Participants {
    pub supervisor: Arc<dyn Supervisor>,
    pub agents: Vec<Arc<dyn AgentBehavior>>,
    pub summarizer: Arc<dyn Summarizer>,
}

/// Final state of a finished investigation
#[derive(Debug, Clone)]
pub struct InvestigationOutcome {
    pub state: InvestigationState,
    pub final_phase: EnginePhase,
}

impl InvestigationOutcome {
    pub fn completed(&self) -> bool {
        self.final_phase == EnginePhase::Done
    }
}

/// Supervisor-routed loop over the investigation agents
pub struct CoordinationEngine {
    participants: Participants,
    iteration_limit: u32,
}

impl CoordinationEngine {
    pub fn new(participants: Participants, iteration_limit: u32) -> Self {
        Self {
            participants,
            iteration_limit: iteration_limit.max(1),
        }
    }

    pub fn iteration_limit(&self) -> u32 {
        self.iteration_limit
    }

    /// Registered investigation agents, in registration order
    pub fn members(&self) -> Vec<ParticipantId> {
        self.participants
            .agents
            .iter()
            .map(|a| a.participant())
            .collect()
    }

    fn agent(&self, id: ParticipantId) -> Option<&Arc<dyn AgentBehavior>> {
        if !id.is_investigator() {
            return None;
        }
        self.participants.agents.iter().find(|a| a.participant() == id)
    }

    /// Run one investigation to a terminal phase
    pub async fn run(&self, alert_description: &str) -> InvestigationOutcome {
        let mut state = InvestigationState::new(alert_description);
        let mut phase = EnginePhase::Routing;

        info!(
            "Starting investigation with {} agents (limit {})",
            self.participants.agents.len(),
            self.iteration_limit
        );

        while !phase.is_terminal() {
            phase = match phase {
                EnginePhase::Routing => self.route(&mut state).await,
                EnginePhase::Dispatching(id) => self.dispatch(&mut state, id).await,
                EnginePhase::Summarizing => self.summarize(&mut state).await,
                EnginePhase::Done | EnginePhase::ErrorTerminated => phase,
            };
        }

        if phase == EnginePhase::Done {
            state.next_participant = Next::Done;
        }

        let outcome = match phase {
            EnginePhase::Done => "done",
            _ => "error",
        };
        metrics::INVESTIGATIONS_TOTAL
            .with_label_values(&[outcome])
            .inc();

        info!(
            "Investigation finished in phase {} after {} iterations ({} messages)",
            phase,
            state.iteration_count,
            state.transcript.len()
        );

        InvestigationOutcome {
            state,
            final_phase: phase,
        }
    }

    async fn route(&self, state: &mut InvestigationState) -> EnginePhase {
        state.iteration_count += 1;

        if state.iteration_count >= self.iteration_limit {
            warn!(
                "Iteration limit {} reached, forcing summary",
                self.iteration_limit
            );
            metrics::FORCED_SUMMARIES_TOTAL.inc();
            state.current_instruction = FORCED_SUMMARY_INSTRUCTION.to_string();
            state.next_participant = Next::Participant(ParticipantId::Summarizer);
            return EnginePhase::Summarizing;
        }

        metrics::ROUTING_DECISIONS_TOTAL.inc();
        let decision = match self.participants.supervisor.decide(&state.transcript).await {
            Ok(decision) => decision,
            Err(e) => {
                error!("Supervisor failed: {:#}", e);
                state.current_instruction = format!(
                    "The supervisor failed ({:#}). Summarize whatever has been gathered so far.",
                    e
                );
                state.next_participant = Next::Participant(ParticipantId::Summarizer);
                return EnginePhase::Summarizing;
            }
        };

        info!(
            "Iteration {}: supervisor chose {:?}",
            state.iteration_count, decision.route
        );
        state.current_instruction = decision.instruction;

        match decision.route {
            Route::Dispatch(id) if self.agent(id).is_some() => {
                state.next_participant = Next::Participant(id);
                EnginePhase::Dispatching(id)
            }
            Route::Dispatch(id) => {
                warn!("{} is not a registered investigation agent, summarizing instead", id);
                state.next_participant = Next::Participant(ParticipantId::Summarizer);
                EnginePhase::Summarizing
            }
            Route::Summarize => {
                state.next_participant = Next::Participant(ParticipantId::Summarizer);
                EnginePhase::Summarizing
            }
            Route::Done => {
                state.next_participant = Next::Done;
                EnginePhase::Done
            }
        }
    }

    async fn dispatch(&self, state: &mut InvestigationState, id: ParticipantId) -> EnginePhase {
        let message = match self.agent(id) {
            Some(agent) => {
                let instruction = Some(state.current_instruction.as_str())
                    .filter(|i| !i.trim().is_empty());
                agent.invoke(&state.transcript, instruction).await
            }
            // Routing only dispatches registered agents
            None => Message::from_participant(id, format!("Error in {}: agent is not registered", id)),
        };

        state.transcript.push(message);
        state.next_participant = Next::Participant(ParticipantId::Supervisor);
        EnginePhase::Routing
    }

    async fn summarize(&self, state: &mut InvestigationState) -> EnginePhase {
        let mut instruction = FINAL_REPORT_INSTRUCTION.to_string();
        if !state.current_instruction.trim().is_empty() {
            instruction.push_str("\n\n");
            instruction.push_str(state.current_instruction.trim());
        }
        state.transcript.push(Message::system(instruction));

        match self.participants.summarizer.summarize(&state.transcript).await {
            Ok(summary) => {
                state.transcript.push(Message::from_participant(
                    ParticipantId::Summarizer,
                    summary.to_report(),
                ));
                EnginePhase::Done
            }
            Err(e) => {
                error!("Summarizer failed: {:#}", e);
                state
                    .transcript
                    .push(Message::system(format!("Error generating summary: {:#}", e)));
                EnginePhase::ErrorTerminated
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{
        summarizer::MockSummarizer, supervisor::MockSupervisor, Decision, Role, Summary, Transcript,
    };
    use async_trait::async_trait;

    struct StaticAgent(ParticipantId);

    #[async_trait]
    impl AgentBehavior for StaticAgent {
        fn participant(&self) -> ParticipantId {
            self.0
        }

        async fn respond(
            &self,
            _transcript: &Transcript,
            instruction: Option<&str>,
        ) -> anyhow::Result<String> {
            Ok(format!("{} looked at: {}", self.0, instruction.unwrap_or("-")))
        }
    }

    fn summary() -> Summary {
        Summary {
            problem: "p".to_string(),
            cause: "c".to_string(),
            solution: "1. s".to_string(),
        }
    }

    fn engine(supervisor: MockSupervisor, summarizer: MockSummarizer, limit: u32) -> CoordinationEngine {
        CoordinationEngine::new(
            Participants {
                supervisor: Arc::new(supervisor),
                agents: vec![Arc::new(StaticAgent(ParticipantId::MetricsAgent))],
                summarizer: Arc::new(summarizer),
            },
            limit,
        )
    }

    #[tokio::test]
    async fn test_unregistered_dispatch_forces_summary() {
        let mut supervisor = MockSupervisor::new();
        supervisor
            .expect_decide()
            .times(1)
            .returning(|_| Ok(Decision::new(Route::Dispatch(ParticipantId::WebSearchAgent), "search")));
        let mut summarizer = MockSummarizer::new();
        summarizer.expect_summarize().times(1).returning(|_| Ok(summary()));

        let outcome = engine(supervisor, summarizer, 10).run("alert").await;

        assert_eq!(outcome.final_phase, EnginePhase::Done);
        assert_eq!(outcome.state.iteration_count, 1);
        assert!(!outcome.state.transcript.contains_reply_from(ParticipantId::WebSearchAgent));
    }

    #[tokio::test]
    async fn test_summarizing_appends_instruction_then_report() {
        let mut supervisor = MockSupervisor::new();
        supervisor
            .expect_decide()
            .times(1)
            .returning(|_| Ok(Decision::new(Route::Summarize, "wrap up")));
        let mut summarizer = MockSummarizer::new();
        summarizer
            .expect_summarize()
            .withf(|t: &Transcript| {
                t.last().map_or(false, |m| {
                    m.role == Role::System && m.content.ends_with("wrap up")
                })
            })
            .times(1)
            .returning(|_| Ok(summary()));

        let outcome = engine(supervisor, summarizer, 10).run("alert").await;
        let messages = outcome.state.transcript.messages();

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].author, Some(ParticipantId::Summarizer));
        assert!(messages[2].content.starts_with("### Problem\np"));
        assert_eq!(outcome.state.next_participant, Next::Done);
    }

    #[tokio::test]
    async fn test_limit_of_one_never_consults_supervisor() {
        let mut supervisor = MockSupervisor::new();
        supervisor.expect_decide().never();
        let mut summarizer = MockSummarizer::new();
        summarizer.expect_summarize().times(1).returning(|_| Ok(summary()));

        let outcome = engine(supervisor, summarizer, 1).run("alert").await;
        assert!(outcome.completed());
        assert_eq!(outcome.state.iteration_count, 1);
        assert!(outcome.state.current_instruction.starts_with("Iteration limit reached"));
    }

    #[test]
    fn test_members_and_limit() {
        let engine = engine(MockSupervisor::new(), MockSummarizer::new(), 0);
        assert_eq!(engine.members(), vec![ParticipantId::MetricsAgent]);
        assert_eq!(engine.iteration_limit(), 1);
    }
}
