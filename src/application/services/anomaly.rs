use std::sync::Arc;

use crate::domain::entities::{Assessment, Baseline};
use crate::domain::ports::{MetricStore, StoreError};
use crate::domain::value_objects::{StoreKey, Z_SCORE_THRESHOLD};

/// Scores samples against the externally maintained `(mean, stddev)` pair.
///
/// Read-only: never writes to the store.
pub struct AnomalyDetector {
    store: Arc<dyn MetricStore>,
}

impl AnomalyDetector {
    #[must_use]
    pub fn new(store: Arc<dyn MetricStore>) -> Self {
        Self { store }
    }

    /// `true` iff the sample's z-score magnitude exceeds the threshold.
    ///
    /// Any case that cannot be scored (store failure, missing or degenerate
    /// baseline) yields `false`.
    pub async fn classify(&self, metric: &str, value: f64) -> bool {
        self.assess(metric, value).await.is_anomaly()
    }

    /// Like [`AnomalyDetector::classify`] but keeps the reason a sample could
    /// not be scored.
    pub async fn assess(&self, metric: &str, value: f64) -> Assessment {
        let baseline = match self.baseline(metric).await {
            Ok(Some(baseline)) => baseline,
            Ok(None) => return Assessment::Unclassifiable("insufficient baseline".into()),
            Err(e) => {
                tracing::warn!(metric, "baseline read failed: {e}");
                return Assessment::Unclassifiable(e.to_string());
            }
        };

        match baseline.z_score(value) {
            Some(z) if z.abs() > Z_SCORE_THRESHOLD => Assessment::Anomalous { z },
            Some(z) => Assessment::Normal { z },
            None => Assessment::Unclassifiable("degenerate baseline".into()),
        }
    }

    /// Read the baseline. Absent, empty or unparsable scalars yield `None`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if either read fails.
    pub async fn baseline(&self, metric: &str) -> Result<Option<Baseline>, StoreError> {
        let mean = self.store.get(&StoreKey::mean(metric)).await?;
        let stddev = self.store.get(&StoreKey::stddev(metric)).await?;
        Ok(parse_scalar(mean.as_deref())
            .zip(parse_scalar(stddev.as_deref()))
            .map(|(mean, stddev)| Baseline::new(mean, stddev)))
    }
}

fn parse_scalar(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
}
