pub mod models;
mod routes;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{analyzer::AlertAnalyzer, sinks::NotificationQueue, Error, Result};

pub use models::{AlertRequest, AnalysisResponse, HealthCheckResponse};

pub struct AppState {
    pub analyzer: AlertAnalyzer,
    pub notifications: NotificationQueue,
}

pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(analyzer: AlertAnalyzer, notifications: NotificationQueue) -> Self {
        Self {
            state: Arc::new(AppState {
                analyzer,
                notifications,
            }),
        }
    }

    pub fn build_router(self) -> Router {
        Router::new()
            .route("/health", get(routes::health))
            .route("/alert", post(routes::handle_alert))
            .route("/metrics", get(routes::metrics_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state)
    }

    pub async fn start(self, addr: &str) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Alert analyzer listening on {}", addr);

        axum::serve(listener, self.build_router())
            .await
            .map_err(|e| Error::Internal(format!("Server error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Config, sinks::StdoutSink};
    use axum::body::{to_bytes, Body};
    use http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn mock_router() -> Router {
        let mut config = Config::default();
        config.llm.provider = "mock".to_string();

        let (queue, _worker) = NotificationQueue::start(Arc::new(StdoutSink::new(false)), 4);
        Server::new(AlertAnalyzer::from_config(&config), queue).build_router()
    }

    #[tokio::test]
    async fn test_alert_route_with_mock_provider() {
        let body = r#"{"alerts":[{"annotations":{"description":"CPU usage > 90%","summary":"High CPU"}}]}"#;
        let request = Request::builder()
            .method("POST")
            .uri("/alert")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = mock_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: AnalysisResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(parsed.is_success());
        assert_eq!(
            parsed.analysis.unwrap().problem,
            "Mock investigation of the reported alert."
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let request = Request::builder().uri("/alerts").body(Body::empty()).unwrap();
        let response = mock_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
