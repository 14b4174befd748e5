use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::domain::ports::store::{MetricStore, StoreError};

struct Scalar {
    value: String,
    expires_at: Option<Instant>,
}

impl Scalar {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// In-process store with the same list and expiry semantics as the
/// external store. Used by tests and by the `memory` backend.
pub struct InMemoryStore {
    scalars: Mutex<HashMap<String, Scalar>>,
    lists: Mutex<HashMap<String, VecDeque<String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scalars: Mutex::new(HashMap::new()),
            lists: Mutex::new(HashMap::new()),
        }
    }

    /// Write a scalar without expiry, as the baseline writer would.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the internal lock is poisoned.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.scalars
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?
            .insert(
                key.to_string(),
                Scalar {
                    value: value.to_string(),
                    expires_at: None,
                },
            );
        Ok(())
    }

    /// Remaining time to live of a scalar, if it has one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the internal lock is poisoned.
    pub fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let now = Instant::now();
        Ok(self
            .scalars
            .lock()
            .map_err(|_| StoreError::ReadFailed("lock poisoned".into()))?
            .get(key)
            .and_then(|s| s.expires_at)
            .map(|at| at.saturating_duration_since(now)))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        let mut scalars = self
            .scalars
            .lock()
            .map_err(|_| StoreError::ReadFailed("lock poisoned".into()))?;
        match scalars.get(key) {
            Some(s) if s.is_live(now) => Ok(Some(s.value.clone())),
            Some(_) => {
                scalars.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.scalars
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?
            .insert(
                key.to_string(),
                Scalar {
                    value: value.to_string(),
                    expires_at: Some(Instant::now() + ttl),
                },
            );
        Ok(())
    }

    async fn push_back(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lists
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?
            .entry(key.to_string())
            .or_default()
            .push_back(value.to_string());
        Ok(())
    }

    async fn trim_to_last(&self, key: &str, keep: usize) -> Result<(), StoreError> {
        let mut lists = self
            .lists
            .lock()
            .map_err(|_| StoreError::WriteFailed("lock poisoned".into()))?;
        if let Some(list) = lists.get_mut(key) {
            let excess = list.len().saturating_sub(keep);
            list.drain(..excess);
            if list.is_empty() {
                lists.remove(key);
            }
        }
        drop(lists);
        Ok(())
    }

    async fn range_all(&self, key: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .lists
            .lock()
            .map_err(|_| StoreError::ReadFailed("lock poisoned".into()))?
            .get(key)
            .map(|list| list.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
