//! Notification Sinks
//!
//! Delivery of finished analyses, decoupled from the HTTP response by a bounded queue.

pub mod email;
pub mod stdout;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::{
    config::{NotificationConfig, NotificationSinkKind},
    metrics,
    report::AnalysisResult,
};

pub use email::EmailSink;
pub use stdout::StdoutSink;

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;
    async fn send(&self, alert_description: &str, analysis: &AnalysisResult) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct NotificationJob {
    pub alert_description: String,
    pub analysis: AnalysisResult,
}

/// Sending side of the background notification worker
#[derive(Clone)]
pub struct NotificationQueue {
    tx: mpsc::Sender<NotificationJob>,
}

impl NotificationQueue {
    /// Spawn the delivery worker and return the queue feeding it
    pub fn start(notifier: Arc<dyn Notifier>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<NotificationJob>(capacity.max(1));

        let handle = tokio::spawn(async move {
            info!("Notification worker started ({})", notifier.name());
            while let Some(job) = rx.recv().await {
                match notifier.send(&job.alert_description, &job.analysis).await {
                    Ok(()) => {
                        metrics::NOTIFICATIONS_TOTAL
                            .with_label_values(&["sent"])
                            .inc();
                    }
                    Err(e) => {
                        error!("{} notification failed: {:#}", notifier.name(), e);
                        metrics::NOTIFICATIONS_TOTAL
                            .with_label_values(&["failed"])
                            .inc();
                    }
                }
            }
            info!("Notification worker stopped");
        });

        (Self { tx }, handle)
    }

    /// Queue a notification without waiting. Returns false when it was dropped.
    pub fn enqueue(&self, job: NotificationJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Notification queue full, dropping notification");
                metrics::NOTIFICATIONS_TOTAL
                    .with_label_values(&["dropped"])
                    .inc();
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!("Notification worker is gone, dropping notification");
                metrics::NOTIFICATIONS_TOTAL
                    .with_label_values(&["dropped"])
                    .inc();
                false
            }
        }
    }
}

/// Build the notifier selected by configuration
pub fn create_notifier(config: &NotificationConfig) -> Result<Arc<dyn Notifier>> {
    match config.sink {
        NotificationSinkKind::Email => Ok(Arc::new(EmailSink::new(config.clone())?)),
        NotificationSinkKind::Stdout => Ok(Arc::new(StdoutSink::new(true))),
    }
}
