use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{info, warn};

use super::Notifier;
use crate::{config::NotificationConfig, report::AnalysisResult, template};

/// Sends the HTML analysis report over SMTP with STARTTLS
pub struct EmailSink {
    config: NotificationConfig,
}

impl EmailSink {
    pub fn new(config: NotificationConfig) -> Result<Self> {
        // Every recipient must parse as a mailbox
        for recipient in &config.recipients {
            recipient
                .parse::<Mailbox>()
                .map_err(|e| anyhow::anyhow!("Invalid recipient '{}': {}", recipient, e))?;
        }
        Ok(Self { config })
    }

    fn build_message(&self, subject: String, html: String) -> Result<Message> {
        let from: Mailbox = self
            .config
            .smtp_username
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid sender '{}': {}", self.config.smtp_username, e))?;

        let mut builder = Message::builder().from(from).subject(subject);
        for recipient in &self.config.recipients {
            builder = builder.to(recipient.parse()?);
        }

        Ok(builder.header(ContentType::TEXT_HTML).body(html)?)
    }
}

#[async_trait]
impl Notifier for EmailSink {
    fn name(&self) -> &str {
        "email"
    }

    async fn send(&self, alert_description: &str, analysis: &AnalysisResult) -> Result<()> {
        if !self.config.smtp_configured() {
            warn!("SMTP settings not configured. Email notification skipped.");
            return Ok(());
        }
        if self.config.recipients.is_empty() {
            warn!("No recipients configured. Email notification skipped.");
            return Ok(());
        }

        let content = template::render_email(alert_description, analysis, Local::now())?;
        let message = self.build_message(content.subject, content.html)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_server)?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            ))
            .build();

        mailer.send(message).await?;
        info!("Email alert sent to {}", self.config.recipients.join(", "));
        Ok(())
    }
}
