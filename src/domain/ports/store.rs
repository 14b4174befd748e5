use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("storage read failed: {0}")]
    ReadFailed(String),
    #[error("storage write failed: {0}")]
    WriteFailed(String),
}

/// Key-value service holding raw samples, rolling windows and baselines.
///
/// Every call is a suspension point; implementations must be shareable
/// across worker tasks.
#[async_trait]
pub trait MetricStore: Send + Sync {
    /// Read a scalar. A missing key is `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be reached or the read fails.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a scalar that expires after `ttl`, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be reached or the write fails.
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration)
    -> Result<(), StoreError>;

    /// Append to the tail of a list, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be reached or the write fails.
    async fn push_back(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Keep only the last `keep` entries of a list.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be reached or the write fails.
    async fn trim_to_last(&self, key: &str, keep: usize) -> Result<(), StoreError>;

    /// Read a whole list, oldest first. A missing key reads as empty.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be reached or the read fails.
    async fn range_all(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// Check reachability.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the store does not answer.
    async fn ping(&self) -> Result<(), StoreError>;
}
