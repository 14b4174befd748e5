pub mod aggregator;
pub mod anomaly;
pub mod ingestor;
pub mod queue;
pub mod rolling_window;

pub use aggregator::{Aggregator, CountingMode};
pub use anomaly::AnomalyDetector;
pub use ingestor::{IngestOutcome, Ingestor};
pub use queue::{IngestQueue, QueueError};
pub use rolling_window::{MetricLocks, RollingWindowEngine};
