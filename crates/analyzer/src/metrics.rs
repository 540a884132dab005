use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::{Error, Result};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref ALERTS_RECEIVED_TOTAL: IntCounter = IntCounter::new(
        "alert_analyzer_alerts_received_total",
        "Total number of alert notifications received."
    )
    .expect("metric definition is valid");
    pub static ref INVESTIGATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "alert_analyzer_investigations_total",
            "Investigations by terminal phase."
        ),
        &["outcome"]
    )
    .expect("metric definition is valid");
    pub static ref ROUTING_DECISIONS_TOTAL: IntCounter = IntCounter::new(
        "alert_analyzer_routing_decisions_total",
        "Supervisor routing decisions taken."
    )
    .expect("metric definition is valid");
    pub static ref FORCED_SUMMARIES_TOTAL: IntCounter = IntCounter::new(
        "alert_analyzer_forced_summaries_total",
        "Investigations summarized because the iteration limit was reached."
    )
    .expect("metric definition is valid");
    pub static ref AGENT_FAULTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "alert_analyzer_agent_faults_total",
            "Agent invocations that ended in a fault."
        ),
        &["participant"]
    )
    .expect("metric definition is valid");
    pub static ref NOTIFICATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "alert_analyzer_notifications_total",
            "Notification deliveries by result."
        ),
        &["result"]
    )
    .expect("metric definition is valid");
}

/// Register every collector with the crate registry. Safe to call more than once.
pub fn register_metrics() -> Result<()> {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(ALERTS_RECEIVED_TOTAL.clone()),
        Box::new(INVESTIGATIONS_TOTAL.clone()),
        Box::new(ROUTING_DECISIONS_TOTAL.clone()),
        Box::new(FORCED_SUMMARIES_TOTAL.clone()),
        Box::new(AGENT_FAULTS_TOTAL.clone()),
        Box::new(NOTIFICATIONS_TOTAL.clone()),
    ];

    for collector in collectors {
        match REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(Error::Internal(format!("Failed to register metric: {}", e))),
        }
    }

    Ok(())
}

/// Gather metrics in the Prometheus text exposition format
pub fn gather_metrics() -> Result<String> {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| Error::Internal(format!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer).map_err(|e| Error::Internal(format!("Metrics are not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_twice_and_gather() {
        register_metrics().unwrap();
        register_metrics().unwrap();

        ALERTS_RECEIVED_TOTAL.inc();
        INVESTIGATIONS_TOTAL.with_label_values(&["done"]).inc();

        let output = gather_metrics().unwrap();
        assert!(output.contains("alert_analyzer_alerts_received_total"));
        assert!(output.contains("alert_analyzer_investigations_total{outcome=\"done\"}"));
    }
}
