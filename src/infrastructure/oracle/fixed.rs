use crate::domain::ports::PredictionOracle;

/// Oracle that always returns the same value.
pub struct FixedOracle {
    value: f64,
}

impl FixedOracle {
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self { value }
    }
}

impl PredictionOracle for FixedOracle {
    fn predict(&self) -> f64 {
        self.value
    }
}
