pub mod engine;
pub mod state;

pub use engine::{CoordinationEngine, InvestigationOutcome, Participants};
pub use state::{EnginePhase, InvestigationState, Next};
