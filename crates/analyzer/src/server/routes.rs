use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use http::{header, StatusCode};
use std::sync::Arc;
use tracing::{error, info};

use super::{
    models::{AlertRequest, AnalysisResponse, HealthCheckResponse},
    AppState,
};
use crate::{metrics, sinks::NotificationJob};

pub async fn health() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    })
}

pub async fn metrics_handler() -> Response {
    match metrics::gather_metrics() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to gather metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Analyze an alert webhook. Always answers 200 with a status field.
pub async fn handle_alert(State(state): State<Arc<AppState>>, body: Bytes) -> Json<AnalysisResponse> {
    metrics::ALERTS_RECEIVED_TOTAL.inc();

    let request: AlertRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            error!("Error processing alert: {}", e);
            return Json(AnalysisResponse::error(e.to_string()));
        }
    };

    let annotations = request.first_annotations();
    info!(
        "Received alert: {} - {}",
        annotations.summary, annotations.description
    );

    let response = state.analyzer.analyze(&annotations.description).await;

    if let Some(analysis) = response.analysis.as_ref().filter(|_| response.is_success()) {
        let queued = state.notifications.enqueue(NotificationJob {
            alert_description: annotations.description.clone(),
            analysis: analysis.clone(),
        });
        if queued {
            info!("Analysis completed and notification queued");
        }
    }

    Json(response)
}
