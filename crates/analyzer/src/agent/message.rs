//! Transcript Model
//!
//! Participants, messages and the append-only transcript shared by one investigation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every participant the coordination engine can hand control to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ParticipantId {
    Supervisor,
    MetricsAgent,
    SourceControlAgent,
    WebSearchAgent,
    Summarizer,
}

impl ParticipantId {
    /// The investigation agents, in the order they are offered to the supervisor.
    pub const INVESTIGATORS: [ParticipantId; 3] = [
        ParticipantId::MetricsAgent,
        ParticipantId::SourceControlAgent,
        ParticipantId::WebSearchAgent,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ParticipantId::Supervisor => "Supervisor",
            ParticipantId::MetricsAgent => "MetricsAgent",
            ParticipantId::SourceControlAgent => "SourceControlAgent",
            ParticipantId::WebSearchAgent => "WebSearchAgent",
            ParticipantId::Summarizer => "Summarizer",
        }
    }

    pub fn is_investigator(&self) -> bool {
        Self::INVESTIGATORS.contains(self)
    }

    /// Resolve a label, accepting the legacy Grafana/GitHub agent names.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "supervisor" => Some(ParticipantId::Supervisor),
            "metricsagent" | "grafanaagent" => Some(ParticipantId::MetricsAgent),
            "sourcecontrolagent" | "githubagent" => Some(ParticipantId::SourceControlAgent),
            "websearchagent" => Some(ParticipantId::WebSearchAgent),
            "summarizer" => Some(ParticipantId::Summarizer),
            _ => None,
        }
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    System,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub author: Option<ParticipantId>,
    pub content: String,
    pub role: Role,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            author: None,
            content: content.into(),
            role: Role::User,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            author: None,
            content: content.into(),
            role: Role::System,
        }
    }

    pub fn from_participant(author: ParticipantId, content: impl Into<String>) -> Self {
        Self {
            author: Some(author),
            content: content.into(),
            role: Role::Agent,
        }
    }

    /// Heading used when the message is shown to a language model.
    fn heading(&self) -> String {
        match (self.role, self.author) {
            (_, Some(author)) => author.label().to_string(),
            (Role::User, None) => "Alert".to_string(),
            (Role::System, None) => "System".to_string(),
            (Role::Agent, None) => "Agent".to_string(),
        }
    }
}

/// Ordered record of every message exchanged during one investigation.
///
/// Messages can only be appended; nothing edits or removes them once pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alert(description: &str) -> Self {
        let mut transcript = Self::new();
        transcript.push(Message::user(description));
        transcript
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn last_authored_by(&self, author: ParticipantId) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.author == Some(author))
    }

    pub fn last_agent_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::Agent)
    }

    pub fn contains_reply_from(&self, author: ParticipantId) -> bool {
        self.last_authored_by(author).is_some()
    }

    /// Render the transcript as labelled blocks for a prompt.
    pub fn render(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("[{}]\n{}", m.heading(), m.content.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip() {
        for id in [
            ParticipantId::Supervisor,
            ParticipantId::MetricsAgent,
            ParticipantId::SourceControlAgent,
            ParticipantId::WebSearchAgent,
            ParticipantId::Summarizer,
        ] {
            assert_eq!(ParticipantId::from_label(id.label()), Some(id));
        }
    }

    #[test]
    fn test_legacy_aliases() {
        assert_eq!(ParticipantId::from_label("GrafanaAgent"), Some(ParticipantId::MetricsAgent));
        assert_eq!(ParticipantId::from_label(" githubagent "), Some(ParticipantId::SourceControlAgent));
        assert_eq!(ParticipantId::from_label("KubectlAgent"), None);
    }

    #[test]
    fn test_transcript_lookups() {
        let mut transcript = Transcript::with_alert("CPU usage exceeded 95%");
        transcript.push(Message::from_participant(ParticipantId::MetricsAgent, "cpu at 97%"));
        transcript.push(Message::system("compile the report"));

        assert_eq!(transcript.len(), 3);
        assert_eq!(
            transcript.last_agent_message().map(|m| m.content.as_str()),
            Some("cpu at 97%")
        );
        assert!(transcript.last_authored_by(ParticipantId::Summarizer).is_none());
        assert!(transcript.contains_reply_from(ParticipantId::MetricsAgent));
    }

    #[test]
    fn test_render_labels_each_message() {
        let mut transcript = Transcript::with_alert("disk full");
        transcript.push(Message::from_participant(ParticipantId::WebSearchAgent, "  found a KB article \n"));

        assert_eq!(
            transcript.render(),
            "[Alert]\ndisk full\n\n[WebSearchAgent]\nfound a KB article"
        );
    }
}
