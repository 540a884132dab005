pub mod agent;
pub mod analyzer;
pub mod config;
pub mod metrics;
pub mod report;
pub mod server;
pub mod sinks;
pub mod template;
pub mod text;
pub mod workflow;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Agent error: {0}")]
    Agent(String),
    #[error("Notification error: {0}")]
    Notification(String),
    #[error("Template error: {0}")]
    Template(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
