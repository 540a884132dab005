//! Investigation Agents Module
//!
//! The participants of a multi-agent alert investigation: tool-calling
//! investigators, the supervisor that routes between them, and the summarizer.

pub mod behavior;
pub mod investigator;
pub mod message;
pub mod provider;
pub mod summarizer;
pub mod supervisor;
pub mod templates;
pub mod tools;

pub use behavior::AgentBehavior;
pub use investigator::ToolAgent;
pub use message::{Message, ParticipantId, Role, Transcript};
pub use provider::{create_provider, CompletionSettings, LLMConfig, LLMProviderType};
pub use summarizer::{LlmSummarizer, Summarizer, Summary};
pub use supervisor::{Decision, LlmSupervisor, Route, Supervisor};
pub use tools::{ToolError, ToolResult, ToolType};
