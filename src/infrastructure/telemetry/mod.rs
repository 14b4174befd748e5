//! Prometheus exporter state.
//!
//! All collectors live in a registry owned by [`Telemetry`], built once at
//! startup and shared by `Arc`. Nothing is registered in the process-global
//! default registry, so several instances can coexist in tests.
//!
//! # Metrics
//!
//! - **rps_total{status}**: ingestion requests by outcome (`success`, `error`)
//! - **anomalies_total**: samples classified as anomalous
//! - **prediction_value**: latest oracle output
//! - **latency_seconds{endpoint}**: handler latency, default buckets

use std::time::Duration;

use prometheus::{
    Counter, CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("metric registration failed: {0}")]
    Registration(#[from] prometheus::Error),
    #[error("exposition is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Outcome label for `rps_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Success,
    Error,
}

impl RequestStatus {
    #[must_use]
    pub const fn as_label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

pub struct Telemetry {
    registry: Registry,
    rps_total: CounterVec,
    anomalies_total: Counter,
    prediction_value: Gauge,
    latency_seconds: HistogramVec,
}

impl Telemetry {
    /// Create the collectors and register them in a fresh registry.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::Registration` if a collector is rejected by
    /// the registry.
    pub fn new() -> Result<Self, TelemetryError> {
        let registry = Registry::new();

        let rps_total = CounterVec::new(
            Opts::new("rps_total", "Ingestion requests by outcome"),
            &["status"],
        )?;
        let anomalies_total = Counter::new("anomalies_total", "Samples flagged as anomalous")?;
        let prediction_value = Gauge::new("prediction_value", "Latest predicted value")?;
        let latency_seconds = HistogramVec::new(
            HistogramOpts::new("latency_seconds", "Handler latency in seconds"),
            &["endpoint"],
        )?;

        registry.register(Box::new(rps_total.clone()))?;
        registry.register(Box::new(anomalies_total.clone()))?;
        registry.register(Box::new(prediction_value.clone()))?;
        registry.register(Box::new(latency_seconds.clone()))?;

        Ok(Self {
            registry,
            rps_total,
            anomalies_total,
            prediction_value,
            latency_seconds,
        })
    }

    pub fn record_request(&self, status: RequestStatus) {
        self.rps_total.with_label_values(&[status.as_label()]).inc();
    }

    pub fn record_anomaly(&self) {
        self.anomalies_total.inc();
    }

    pub fn set_prediction(&self, value: f64) {
        self.prediction_value.set(value);
    }

    pub fn observe_latency(&self, endpoint: &str, elapsed: Duration) {
        self.latency_seconds
            .with_label_values(&[endpoint])
            .observe(elapsed.as_secs_f64());
    }

    /// Encode every registered collector in the text exposition format.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError` if encoding fails.
    pub fn render(&self) -> Result<String, TelemetryError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    #[must_use]
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }
}
