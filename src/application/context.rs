use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::config::{AppConfig, IngestConfig};
use crate::application::services::{
    Aggregator, AnomalyDetector, IngestQueue, Ingestor, RollingWindowEngine,
};
use crate::domain::ports::{MetricStore, PredictionOracle};
use crate::infrastructure::oracle::create_oracle;
use crate::infrastructure::persistence::create_store;
use crate::infrastructure::telemetry::{Telemetry, TelemetryError};

/// Process-wide singletons, built once at startup and torn down explicitly.
pub struct AppContext {
    pub store: Arc<dyn MetricStore>,
    pub aggregator: Arc<Aggregator>,
    pub telemetry: Arc<Telemetry>,
    pub queue: IngestQueue,
}

impl AppContext {
    /// Wire the pipeline around an existing store and oracle and start the
    /// ingestion workers. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError` if the exporter registry cannot be built.
    pub fn build(
        store: Arc<dyn MetricStore>,
        oracle: Arc<dyn PredictionOracle>,
        ingest: &IngestConfig,
    ) -> Result<Self, TelemetryError> {
        let telemetry = Arc::new(Telemetry::new()?);
        let aggregator = Arc::new(Aggregator::new(ingest.counting));

        let window = RollingWindowEngine::new(
            Arc::clone(&store),
            oracle,
            Arc::clone(&aggregator),
            Arc::clone(&telemetry),
            ingest.serialize_per_metric,
        );
        let detector = AnomalyDetector::new(Arc::clone(&store));
        let ingestor = Arc::new(Ingestor::new(
            Arc::clone(&store),
            window,
            detector,
            Arc::clone(&aggregator),
            Arc::clone(&telemetry),
        ));
        let queue = IngestQueue::start(ingestor, ingest.queue_capacity, ingest.workers);

        Ok(Self {
            store,
            aggregator,
            telemetry,
            queue,
        })
    }

    /// Connect to the configured store and build the context.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be created or does not answer the
    /// initial ping; the process must not start in that case.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let store = create_store(&config.store).context("Failed to create store")?;
        store.ping().await.with_context(|| {
            format!("Failed to connect to store at {}", config.store.addr)
        })?;
        tracing::info!(addr = %config.store.addr, backend = ?config.store.backend, "store connected");

        let oracle = create_oracle(&config.prediction);
        Self::build(store, oracle, &config.ingest).context("Failed to initialize telemetry")
    }

    /// Drain pending samples and stop the workers.
    pub async fn shutdown(&self) {
        self.queue.shutdown().await;
    }
}
