use serde::{Deserialize, Serialize};

/// Point-in-time view of the process-wide analytics counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub prediction: f64,
    /// Nominal window size reported to callers, independent of the real
    /// rolling window capacity.
    pub window_size: u64,
    pub total_count: u64,
    pub anomaly_count: u64,
}
