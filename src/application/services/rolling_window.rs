use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use super::aggregator::Aggregator;
use crate::domain::ports::{MetricStore, PredictionOracle};
use crate::domain::value_objects::StoreKey;
use crate::infrastructure::telemetry::Telemetry;

const DEFAULT_SHARDS: usize = 64;

/// Sharded async locks keyed by metric name.
///
/// Two samples for the same metric always map to the same shard, so their
/// read/append/trim sequences never interleave. Distinct metrics may share a
/// shard.
pub struct MetricLocks {
    shards: Vec<Mutex<()>>,
}

impl MetricLocks {
    #[must_use]
    pub fn new(shards: usize) -> Self {
        Self {
            shards: (0..shards.max(1)).map(|_| Mutex::new(())).collect(),
        }
    }

    pub async fn lock(&self, metric: &str) -> MutexGuard<'_, ()> {
        let mut hasher = DefaultHasher::new();
        metric.hash(&mut hasher);
        // Modulo keeps the index below shards.len(), which fits in usize.
        #[allow(clippy::cast_possible_truncation)]
        let index = (hasher.finish() % self.shards.len() as u64) as usize;
        self.shards[index].lock().await
    }
}

impl Default for MetricLocks {
    fn default() -> Self {
        Self::new(DEFAULT_SHARDS)
    }
}

/// Maintains the bounded per-metric history in the store and computes the
/// moving average for each new value.
///
/// Every call also refreshes the prediction: the oracle is consulted once and
/// its output published to the aggregator and the exporter gauge.
pub struct RollingWindowEngine {
    store: Arc<dyn MetricStore>,
    oracle: Arc<dyn PredictionOracle>,
    aggregator: Arc<Aggregator>,
    telemetry: Arc<Telemetry>,
    locks: Option<MetricLocks>,
}

impl RollingWindowEngine {
    #[must_use]
    pub fn new(
        store: Arc<dyn MetricStore>,
        oracle: Arc<dyn PredictionOracle>,
        aggregator: Arc<Aggregator>,
        telemetry: Arc<Telemetry>,
        serialize_per_metric: bool,
    ) -> Self {
        Self {
            store,
            oracle,
            aggregator,
            telemetry,
            locks: serialize_per_metric.then(MetricLocks::default),
        }
    }

    /// Append `value` to the window of `metric` and return the moving average.
    ///
    /// The average covers the stored values plus `value`, taken before the
    /// window is trimmed to its last `window_size + 1` entries. If the window
    /// cannot be read, `value` itself is returned and nothing is written.
    pub async fn update_window(&self, metric: &str, value: f64, window_size: usize) -> f64 {
        let _guard = match &self.locks {
            Some(locks) => Some(locks.lock(metric).await),
            None => None,
        };
        let average = self.append_and_average(metric, value, window_size).await;
        self.refresh_prediction();
        average
    }

    async fn append_and_average(&self, metric: &str, value: f64, window_size: usize) -> f64 {
        let key = StoreKey::rolling(metric);

        let existing = match self.store.range_all(&key).await {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(metric, "rolling window read failed, degrading: {e}");
                return value;
            }
        };

        let mut sum = value;
        let mut count = 1u32;
        // Every stored entry counts toward the divisor; unparsable ones add 0.
        for raw in &existing {
            match raw.parse::<f64>() {
                Ok(v) => sum += v,
                Err(_) => tracing::debug!(metric, raw = %raw, "unparsable window entry counted as 0"),
            }
            count += 1;
        }

        if let Err(e) = self.store.push_back(&key, &value.to_string()).await {
            tracing::warn!(metric, "rolling window append failed: {e}");
        } else if let Err(e) = self.store.trim_to_last(&key, window_size + 1).await {
            tracing::warn!(metric, "rolling window trim failed: {e}");
        }

        sum / f64::from(count)
    }

    fn refresh_prediction(&self) {
        let prediction = self.oracle.predict();
        self.aggregator.set_prediction(prediction);
        self.telemetry.set_prediction(prediction);
    }
}
