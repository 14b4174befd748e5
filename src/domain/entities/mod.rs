pub mod baseline;
pub mod sample;
pub mod snapshot;

pub use baseline::{Assessment, Baseline};
pub use sample::{IngestRequest, MetricSample, ValidationError};
pub use snapshot::AnalyticsSnapshot;
