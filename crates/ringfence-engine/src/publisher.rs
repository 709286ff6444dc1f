//! Alert publishing.
//!
//! Packages detector results into alert records and appends them to the
//! sink. Delivery is best-effort: a sink failure is logged and swallowed so
//! the cycle's banning step still runs on the in-memory results.

use crate::transport::AlertSink;
use ringfence_core::prelude::{
    Alert, AlertDetails, AlertType, LayeringCase, SmurfingCase, TriangleCase,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Best-effort alert publisher.
pub struct AlertPublisher {
    sink: Arc<dyn AlertSink>,
}

impl AlertPublisher {
    /// Create a publisher over a sink.
    #[must_use]
    pub fn new(sink: Arc<dyn AlertSink>) -> Self {
        Self { sink }
    }

    /// Publish one cycle's results, at most one alert record per pattern.
    /// Empty case lists produce nothing. Returns how many alerts were
    /// actually appended.
    pub async fn publish(
        &self,
        layering: Vec<LayeringCase>,
        smurfing: Vec<SmurfingCase>,
        structuring: Vec<TriangleCase>,
    ) -> usize {
        let mut alerts = Vec::new();
        if !layering.is_empty() {
            alerts.push(Alert::new(
                AlertType::Layering,
                AlertDetails::Layering(layering),
            ));
        }
        if !smurfing.is_empty() {
            alerts.push(Alert::new(
                AlertType::Smurfing,
                AlertDetails::Smurfing(smurfing),
            ));
        }
        if !structuring.is_empty() {
            alerts.push(Alert::new(
                AlertType::Structuring,
                AlertDetails::Structuring(structuring),
            ));
        }

        let mut published = 0;
        for alert in &alerts {
            match self.sink.append(alert).await {
                Ok(()) => {
                    info!(
                        alert_type = %alert.alert_type,
                        cases = alert.count,
                        "alert published"
                    );
                    published += 1;
                }
                Err(e) => {
                    warn!(alert_type = %alert.alert_type, error = %e, "alert delivery failed");
                }
            }
        }
        published
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryAlertLog;
    use async_trait::async_trait;
    use ringfence_core::prelude::{EngineError, Result};

    struct FailingSink;

    #[async_trait]
    impl AlertSink for FailingSink {
        async fn append(&self, _alert: &Alert) -> Result<()> {
            Err(EngineError::transport("sink down"))
        }
    }

    fn create_triangle() -> TriangleCase {
        TriangleCase {
            accounts: ["a".into(), "b".into(), "c".into()],
        }
    }

    #[tokio::test]
    async fn test_empty_results_publish_nothing() {
        let log = Arc::new(MemoryAlertLog::new());
        let publisher = AlertPublisher::new(Arc::clone(&log) as Arc<dyn AlertSink>);
        let published = publisher.publish(vec![], vec![], vec![]).await;
        assert_eq!(published, 0);
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_one_alert_per_pattern() {
        let log = Arc::new(MemoryAlertLog::new());
        let publisher = AlertPublisher::new(Arc::clone(&log) as Arc<dyn AlertSink>);
        let published = publisher
            .publish(
                vec![],
                vec![],
                vec![create_triangle(), create_triangle()],
            )
            .await;
        assert_eq!(published, 1);
        let alerts = log.snapshot();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::Structuring);
        assert_eq!(alerts[0].count, 2);
    }

    #[tokio::test]
    async fn test_sink_failure_is_swallowed() {
        let publisher = AlertPublisher::new(Arc::new(FailingSink));
        let published = publisher
            .publish(vec![], vec![], vec![create_triangle()])
            .await;
        assert_eq!(published, 0);
    }
}
