pub mod fixed;
pub mod random;

use std::sync::Arc;

use crate::application::config::PredictionConfig;
use crate::domain::ports::PredictionOracle;

use self::fixed::FixedOracle;
use self::random::RandomOracle;

/// Create the prediction oracle selected by configuration.
///
/// Falls back to [`RandomOracle`] when the provider is unknown.
#[must_use]
pub fn create_oracle(config: &PredictionConfig) -> Arc<dyn PredictionOracle> {
    match config.provider.trim() {
        "random" => Arc::new(RandomOracle::new()),
        "fixed" => Arc::new(FixedOracle::new(config.fixed_value)),
        _ => {
            tracing::warn!(
                provider = %config.provider,
                "unknown prediction provider, falling back to random"
            );
            Arc::new(RandomOracle::new())
        }
    }
}
