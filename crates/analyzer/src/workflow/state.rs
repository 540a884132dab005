use serde::Serialize;
use std::fmt;

use crate::agent::{ParticipantId, Transcript};

/// Where the coordination loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    Routing,
    Dispatching(ParticipantId),
    Summarizing,
    Done,
    ErrorTerminated,
}

impl EnginePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, EnginePhase::Done | EnginePhase::ErrorTerminated)
    }
}

impl fmt::Display for EnginePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnginePhase::Routing => write!(f, "Routing"),
            EnginePhase::Dispatching(id) => write!(f, "Dispatching({})", id),
            EnginePhase::Summarizing => write!(f, "Summarizing"),
            EnginePhase::Done => write!(f, "Done"),
            EnginePhase::ErrorTerminated => write!(f, "ErrorTerminated"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Next {
    Participant(ParticipantId),
    Done,
}

/// Mutable state of one investigation, owned by the engine loop
#[derive(Debug, Clone, Serialize)]
pub struct InvestigationState {
    pub transcript: Transcript,
    pub next_participant: Next,
    pub current_instruction: String,
    pub iteration_count: u32,
}

impl InvestigationState {
    pub fn new(alert_description: &str) -> Self {
        Self {
            transcript: Transcript::with_alert(alert_description),
            next_participant: Next::Participant(ParticipantId::Supervisor),
            current_instruction: String::new(),
            iteration_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state() {
        let state = InvestigationState::new("disk almost full");
        assert_eq!(state.iteration_count, 0);
        assert_eq!(state.next_participant, Next::Participant(ParticipantId::Supervisor));
        assert_eq!(state.transcript.len(), 1);
    }

    #[test]
    fn test_terminal_phases() {
        assert!(EnginePhase::Done.is_terminal());
        assert!(EnginePhase::ErrorTerminated.is_terminal());
        assert!(!EnginePhase::Dispatching(ParticipantId::MetricsAgent).is_terminal());
        assert_eq!(
            EnginePhase::Dispatching(ParticipantId::MetricsAgent).to_string(),
            "Dispatching(MetricsAgent)"
        );
    }
}
