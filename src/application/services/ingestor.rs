use std::sync::Arc;

use super::aggregator::Aggregator;
use super::anomaly::AnomalyDetector;
use super::rolling_window::RollingWindowEngine;
use crate::domain::entities::{IngestRequest, MetricSample, ValidationError};
use crate::domain::ports::MetricStore;
use crate::domain::value_objects::{RAW_SAMPLE_TTL, StoreKey, WINDOW_SIZE};
use crate::infrastructure::telemetry::Telemetry;

/// Last state reached by a sample in the background pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// The raw write failed; the sample was abandoned before analysis.
    NotPersisted,
    /// The sample was analyzed and counted.
    Counted { moving_average: f64, anomaly: bool },
}

/// Runs one sample through persist → analyze → count.
///
/// Nothing is retried and partial effects are never rolled back.
pub struct Ingestor {
    store: Arc<dyn MetricStore>,
    window: RollingWindowEngine,
    detector: AnomalyDetector,
    aggregator: Arc<Aggregator>,
    telemetry: Arc<Telemetry>,
}

impl Ingestor {
    #[must_use]
    pub fn new(
        store: Arc<dyn MetricStore>,
        window: RollingWindowEngine,
        detector: AnomalyDetector,
        aggregator: Arc<Aggregator>,
        telemetry: Arc<Telemetry>,
    ) -> Self {
        Self {
            store,
            window,
            detector,
            aggregator,
            telemetry,
        }
    }

    /// Synchronous validation done on the request path, before any store call.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if a required field is missing or zero.
    pub fn validate(request: IngestRequest) -> Result<MetricSample, ValidationError> {
        MetricSample::try_from(request)
    }

    pub async fn process(&self, sample: &MetricSample) -> IngestOutcome {
        let name = sample.name();
        let value = sample.value();

        let raw_key = StoreKey::raw(name, sample.timestamp());
        if let Err(e) = self
            .store
            .set_with_expiry(&raw_key, &value.to_string(), RAW_SAMPLE_TTL)
            .await
        {
            tracing::warn!(metric = name, timestamp = sample.timestamp(), "raw sample write failed: {e}");
            return IngestOutcome::NotPersisted;
        }

        let moving_average = self.window.update_window(name, value, WINDOW_SIZE).await;
        tracing::info!(
            "Rolling avg for {name} at timestamp {} is {moving_average:.2}",
            sample.timestamp()
        );

        let anomaly = self.detector.classify(name, value).await;

        self.aggregator.record_ingested();
        if anomaly {
            self.aggregator.record_anomaly();
            self.telemetry.record_anomaly();
            tracing::warn!(
                metric = name,
                "ANOMALY DETECTED: value {value} exceeds normal distribution bounds"
            );
        }

        IngestOutcome::Counted {
            moving_average,
            anomaly,
        }
    }
}
