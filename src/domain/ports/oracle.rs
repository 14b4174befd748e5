/// Source of the forecast published alongside the analytics counters.
///
/// Implementations are swapped in without touching any caller; the oracle
/// has no failure mode.
pub trait PredictionOracle: Send + Sync {
    fn predict(&self) -> f64;
}
