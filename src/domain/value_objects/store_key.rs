/// Key layout of the external store.
///
/// - `<metric>:rolling` list of recent values
/// - `<metric>:mean`, `<metric>:stddev` baseline scalars (externally written)
/// - `<metric>:<timestamp>` raw sample, expiring
pub struct StoreKey;

impl StoreKey {
    #[must_use]
    pub fn rolling(metric: &str) -> String {
        format!("{metric}:rolling")
    }

    #[must_use]
    pub fn mean(metric: &str) -> String {
        format!("{metric}:mean")
    }

    #[must_use]
    pub fn stddev(metric: &str) -> String {
        format!("{metric}:stddev")
    }

    #[must_use]
    pub fn raw(metric: &str, timestamp: i64) -> String {
        format!("{metric}:{timestamp}")
    }
}
