use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use super::Notifier;
use crate::report::AnalysisResult;

/// Prints each analysis as JSON, for local runs without SMTP
#[derive(Debug)]
pub struct StdoutSink {
    pretty: bool,
}

impl StdoutSink {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render(&self, alert_description: &str, analysis: &AnalysisResult) -> Result<String> {
        let payload = json!({
            "alert_description": alert_description,
            "analysis": analysis,
        });

        Ok(if self.pretty {
            serde_json::to_string_pretty(&payload)?
        } else {
            serde_json::to_string(&payload)?
        })
    }
}

#[async_trait]
impl Notifier for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    async fn send(&self, alert_description: &str, analysis: &AnalysisResult) -> Result<()> {
        println!("{}", self.render(alert_description, analysis)?);
        Ok(())
    }
}
