//! Agent Behavior Abstraction
//!
//! Core trait for the investigation agents the coordination engine dispatches to.

use anyhow::Result;
use async_trait::async_trait;
use tracing::{error, info};

use super::message::{Message, ParticipantId, Transcript};
use crate::metrics;

/// An investigation agent: reads the transcript, answers with one message.
#[async_trait]
pub trait AgentBehavior: Send + Sync {
    /// Participant id this agent's replies are tagged with
    fn participant(&self) -> ParticipantId;

    /// Produce the reply text. Faults are reported through the result.
    async fn respond(&self, transcript: &Transcript, instruction: Option<&str>) -> Result<String>;

    /// Produce exactly one message, converting any fault into its content.
    async fn invoke(&self, transcript: &Transcript, instruction: Option<&str>) -> Message {
        let id = self.participant();
        info!("====== {} started ({} messages in) ======", id, transcript.len());

        match self.respond(transcript, instruction).await {
            Ok(content) => {
                info!("====== {} completed ======", id);
                Message::from_participant(id, content)
            }
            Err(e) => {
                error!("{} failed: {:#}", id, e);
                metrics::AGENT_FAULTS_TOTAL
                    .with_label_values(&[id.label()])
                    .inc();
                Message::from_participant(id, format!("Error in {}: {:#}", id, e))
            }
        }
    }
}
