use crate::domain::ports::PredictionOracle;

/// Stand-in forecaster: a uniform draw from `[0, 1)`, unrelated to history.
pub struct RandomOracle;

impl RandomOracle {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for RandomOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionOracle for RandomOracle {
    fn predict(&self) -> f64 {
        rand::random::<f64>()
    }
}
