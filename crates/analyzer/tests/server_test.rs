mod common;

use alert_analyzer::{
    agent::{ParticipantId, Route},
    analyzer::AlertAnalyzer,
    metrics,
    server::{AnalysisResponse, Server},
    sinks::NotificationQueue,
    workflow::Participants,
};
use axum::http::StatusCode;
use axum_test::TestServer;
use common::{investigators, RecordingNotifier, ScriptedFactory, ScriptedSummarizer, ScriptedSupervisor};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn cpu_participants(summarizer: Arc<ScriptedSummarizer>) -> Participants {
    Participants {
        supervisor: Arc::new(ScriptedSupervisor::dispatching(
            &[
                ParticipantId::MetricsAgent,
                ParticipantId::SourceControlAgent,
                ParticipantId::WebSearchAgent,
            ],
            Route::Summarize,
        )),
        agents: investigators(),
        summarizer,
    }
}

fn test_server(summarizer: Arc<ScriptedSummarizer>, notifier: Arc<RecordingNotifier>) -> TestServer {
    let factory = ScriptedFactory(move || cpu_participants(summarizer.clone()));
    let analyzer = AlertAnalyzer::new(Arc::new(factory), 10);
    let (queue, _worker) = NotificationQueue::start(notifier, 8);

    TestServer::new(Server::new(analyzer, queue).build_router()).unwrap()
}

fn cpu_summarizer() -> Arc<ScriptedSummarizer> {
    Arc::new(ScriptedSummarizer::ok(
        "High CPU",
        "Runaway process",
        "Restart service X",
    ))
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = test_server(cpu_summarizer(), Arc::new(RecordingNotifier::default()));

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_alert_is_analyzed_and_notified() {
    let notifier = Arc::new(RecordingNotifier::default());
    let server = test_server(cpu_summarizer(), notifier.clone());

    let response = server
        .post("/alert")
        .json(&json!({
            "alerts": [{
                "annotations": {
                    "description": "CPU usage exceeded 95%",
                    "summary": "High CPU"
                }
            }]
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: AnalysisResponse = response.json();
    assert_eq!(body.status, "success");

    let analysis = body.analysis.unwrap();
    assert_eq!(analysis.problem, "High CPU");
    assert_eq!(analysis.cause, "Runaway process");
    assert_eq!(analysis.solution, "Restart service X");
    assert!(body.raw_response.unwrap().contains("### Root Cause"));

    // Delivery happens on the background worker
    for _ in 0..50 {
        if !notifier.sent.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "CPU usage exceeded 95%");
    assert_eq!(sent[0].1, analysis);
}

#[tokio::test]
async fn test_alert_without_alerts_uses_default_description() {
    let summarizer = cpu_summarizer();
    let server = test_server(summarizer.clone(), Arc::new(RecordingNotifier::default()));

    let response = server.post("/alert").json(&json!({})).await;

    let body: AnalysisResponse = response.json();
    assert!(body.is_success());

    let seen = summarizer.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].messages()[0].content.contains("No description provided"));
}

#[tokio::test]
async fn test_malformed_alert_returns_error_status() {
    let notifier = Arc::new(RecordingNotifier::default());
    let server = test_server(cpu_summarizer(), notifier.clone());

    let response = server.post("/alert").text("not json").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: AnalysisResponse = response.json();
    assert_eq!(body.status, "error");
    assert!(body.message.is_some_and(|m| !m.is_empty()));
    assert!(body.analysis.is_none());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    metrics::register_metrics().unwrap();
    let server = test_server(cpu_summarizer(), Arc::new(RecordingNotifier::default()));

    server.post("/alert").json(&json!({})).await;
    let response = server.get("/metrics").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("alerts_received_total"));
}
