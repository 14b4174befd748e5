use std::time::Duration;

/// Rolling window size used by the ingestion path. The stored window keeps
/// `WINDOW_SIZE + 1` entries so it covers both the previous and the current
/// history.
pub const WINDOW_SIZE: usize = 10;

/// Window size advertised in analytics snapshots.
pub const REPORTED_WINDOW_SIZE: u64 = 50;

/// A sample is anomalous when `|z| > Z_SCORE_THRESHOLD`.
pub const Z_SCORE_THRESHOLD: f64 = 2.0;

/// Expiry applied to raw samples written under `<metric>:<timestamp>`.
pub const RAW_SAMPLE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
