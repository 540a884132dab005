use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::report::AnalysisResult;

pub const DEFAULT_DESCRIPTION: &str = "No description provided";
pub const DEFAULT_SUMMARY: &str = "No summary provided";

/// Alertmanager-style webhook payload. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertRequest {
    pub alerts: Vec<Alert>,
    pub common_annotations: Option<HashMap<String, String>>,
    pub common_labels: Option<HashMap<String, String>>,
    #[serde(rename = "externalURL")]
    pub external_url: Option<String>,
    pub group_key: Option<String>,
    pub group_labels: Option<HashMap<String, String>>,
    pub receiver: Option<String>,
    pub status: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Alert {
    pub annotations: AlertAnnotations,
    pub labels: Option<HashMap<String, String>>,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    #[serde(rename = "generatorURL")]
    pub generator_url: Option<String>,
    pub status: Option<String>,
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertAnnotations {
    pub description: String,
    pub summary: String,
}

impl Default for AlertAnnotations {
    fn default() -> Self {
        Self {
            description: DEFAULT_DESCRIPTION.to_string(),
            summary: DEFAULT_SUMMARY.to_string(),
        }
    }
}

impl AlertRequest {
    /// Annotations of the first alert, or the defaults when there is none
    pub fn first_annotations(&self) -> AlertAnnotations {
        self.alerts
            .first()
            .map(|a| a.annotations.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AnalysisResponse {
    pub fn success(analysis: AnalysisResult, raw_response: String) -> Self {
        Self {
            status: "success".to_string(),
            analysis: Some(analysis),
            raw_response: Some(raw_response),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            analysis: None,
            raw_response: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub timestamp: String,
}
