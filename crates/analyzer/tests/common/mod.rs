#![allow(dead_code)]

use alert_analyzer::{
    agent::{AgentBehavior, Decision, ParticipantId, Route, Summarizer, Summary, Supervisor, Transcript},
    analyzer::ParticipantFactory,
    report::AnalysisResult,
    sinks::Notifier,
    workflow::Participants,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Supervisor that replays a fixed list of decisions, then asks for a summary
#[derive(Default)]
pub struct ScriptedSupervisor {
    script: Mutex<VecDeque<Result<Decision, String>>>,
    pub calls: Mutex<Vec<usize>>,
}

impl ScriptedSupervisor {
    pub fn new(script: Vec<Result<Decision, String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn dispatching(ids: &[ParticipantId], then: Route) -> Self {
        let mut script: Vec<Result<Decision, String>> = ids
            .iter()
            .map(|id| Ok(Decision::new(Route::Dispatch(*id), format!("{} please investigate", id))))
            .collect();
        script.push(Ok(Decision::new(then, "")));
        Self::new(script)
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Supervisor for ScriptedSupervisor {
    async fn decide(&self, transcript: &Transcript) -> anyhow::Result<Decision> {
        self.calls.lock().unwrap().push(transcript.len());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(decision)) => Ok(decision),
            Some(Err(e)) => Err(anyhow::anyhow!(e)),
            None => Ok(Decision::new(Route::Summarize, "")),
        }
    }
}

/// Summarizer returning a fixed result and recording what it was shown
pub struct ScriptedSummarizer {
    result: Result<Summary, String>,
    pub seen: Mutex<Vec<Transcript>>,
}

impl ScriptedSummarizer {
    pub fn ok(problem: &str, cause: &str, solution: &str) -> Self {
        Self {
            result: Ok(Summary {
                problem: problem.to_string(),
                cause: cause.to_string(),
                solution: solution.to_string(),
            }),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            result: Err(error.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    async fn summarize(&self, transcript: &Transcript) -> anyhow::Result<Summary> {
        self.seen.lock().unwrap().push(transcript.clone());
        self.result.clone().map_err(|e| anyhow::anyhow!(e))
    }
}

/// Agent that reports a canned finding, or fails every time
pub struct CannedAgent {
    id: ParticipantId,
    reply: Result<String, String>,
}

impl CannedAgent {
    pub fn replying(id: ParticipantId, reply: &str) -> Self {
        Self {
            id,
            reply: Ok(reply.to_string()),
        }
    }

    pub fn failing(id: ParticipantId, error: &str) -> Self {
        Self {
            id,
            reply: Err(error.to_string()),
        }
    }
}

#[async_trait]
impl AgentBehavior for CannedAgent {
    fn participant(&self) -> ParticipantId {
        self.id
    }

    async fn respond(&self, _transcript: &Transcript, _instruction: Option<&str>) -> anyhow::Result<String> {
        self.reply.clone().map_err(|e| anyhow::anyhow!(e))
    }
}

pub fn investigators() -> Vec<Arc<dyn AgentBehavior>> {
    vec![
        Arc::new(CannedAgent::replying(
            ParticipantId::MetricsAgent,
            "CPU at 97% on node-1 since 14:02",
        )),
        Arc::new(CannedAgent::replying(
            ParticipantId::SourceControlAgent,
            "Commit abc1234 doubled the worker count",
        )),
        Arc::new(CannedAgent::replying(
            ParticipantId::WebSearchAgent,
            "Known issue: worker storms after config reloads",
        )),
    ]
}

/// Factory handing out the participants produced by a closure
pub struct ScriptedFactory<F>(pub F);

impl<F> ParticipantFactory for ScriptedFactory<F>
where
    F: Fn() -> Participants + Send + Sync,
{
    fn build(&self) -> anyhow::Result<Participants> {
        Ok((self.0)())
    }
}

/// Notifier that keeps every delivered alert
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, AnalysisResult)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, alert_description: &str, analysis: &AnalysisResult) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((alert_description.to_string(), analysis.clone()));
        Ok(())
    }
}
