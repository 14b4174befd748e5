use serde::{Deserialize, Serialize};

/// Reference distribution for a metric, written by an external process.
///
/// Used for anomaly detection: a sample is anomalous when its z-score
/// against this baseline exceeds the fixed threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub mean: f64,
    /// Standard deviation. Zero means the baseline cannot classify anything.
    pub stddev: f64,
}

impl Baseline {
    #[must_use]
    pub const fn new(mean: f64, stddev: f64) -> Self {
        Self { mean, stddev }
    }

    /// `(value - mean) / stddev`, or `None` when the baseline is degenerate.
    #[must_use]
    pub fn z_score(&self, value: f64) -> Option<f64> {
        if !self.mean.is_finite() || !self.stddev.is_finite() || self.stddev == 0.0 {
            return None;
        }
        Some((value - self.mean) / self.stddev)
    }
}

/// Outcome of scoring a sample against its baseline.
#[derive(Debug, Clone, PartialEq)]
pub enum Assessment {
    Anomalous { z: f64 },
    Normal { z: f64 },
    Unclassifiable(String),
}

impl Assessment {
    #[must_use]
    pub const fn is_anomaly(&self) -> bool {
        matches!(self, Self::Anomalous { .. })
    }
}
