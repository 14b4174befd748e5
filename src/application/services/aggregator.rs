use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::domain::entities::AnalyticsSnapshot;
use crate::domain::value_objects::REPORTED_WINDOW_SIZE;

/// How counter increments are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingMode {
    /// Atomic read-modify-write; no increment is ever lost.
    #[default]
    Atomic,
    /// Separate load and store. Concurrent increments can overwrite each
    /// other, so counts may fall short under load.
    LoadStore,
}

/// Process-wide counters and the latest prediction.
///
/// Counters are atomics and never take the lock. The prediction sits behind
/// a reader/writer lock whose shared side is held by [`Aggregator::snapshot`].
pub struct Aggregator {
    total_count: AtomicU64,
    anomaly_count: AtomicU64,
    prediction: RwLock<f64>,
    mode: CountingMode,
}

impl Aggregator {
    #[must_use]
    pub const fn new(mode: CountingMode) -> Self {
        Self {
            total_count: AtomicU64::new(0),
            anomaly_count: AtomicU64::new(0),
            prediction: RwLock::new(0.0),
            mode,
        }
    }

    pub fn record_ingested(&self) {
        self.bump(&self.total_count);
    }

    /// Must be called after [`Aggregator::record_ingested`] for the same sample.
    ///
    /// Always atomic, whatever the counting mode.
    pub fn record_anomaly(&self) {
        self.anomaly_count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn set_prediction(&self, value: f64) {
        *self
            .prediction
            .write()
            .unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// Consistent view of the counters.
    ///
    /// `anomaly_count <= total_count` holds in every snapshot. The anomaly
    /// count is read first; in [`CountingMode::LoadStore`] the total can
    /// still lose increments, so the reported anomaly count is capped at it.
    #[must_use]
    pub fn snapshot(&self) -> AnalyticsSnapshot {
        let prediction = self.prediction.read().unwrap_or_else(PoisonError::into_inner);
        let anomaly_count = self.anomaly_count.load(Ordering::SeqCst);
        let total_count = self.total_count.load(Ordering::SeqCst);
        let anomaly_count = anomaly_count.min(total_count);
        AnalyticsSnapshot {
            prediction: *prediction,
            window_size: REPORTED_WINDOW_SIZE,
            total_count,
            anomaly_count,
        }
    }

    fn bump(&self, counter: &AtomicU64) {
        match self.mode {
            CountingMode::Atomic => {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            CountingMode::LoadStore => {
                let current = counter.load(Ordering::SeqCst);
                std::hint::spin_loop();
                counter.store(current + 1, Ordering::SeqCst);
            }
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(CountingMode::Atomic)
    }
}
