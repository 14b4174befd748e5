pub mod oracle;
pub mod store;

pub use oracle::PredictionOracle;
pub use store::{MetricStore, StoreError};
