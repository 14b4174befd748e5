pub mod analytics;
pub mod exporter;
pub mod health;
pub mod ingest;

pub use analytics::get_analytics;
pub use exporter::export_metrics;
pub use health::health_check;
pub use ingest::ingest_metric;
