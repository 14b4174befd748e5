pub mod in_memory_store;
pub mod redis_store;

use std::sync::Arc;

use crate::application::config::{StoreBackend, StoreConfig};
use crate::domain::ports::{MetricStore, StoreError};

use self::in_memory_store::InMemoryStore;
use self::redis_store::RedisStore;

/// Create the store adapter selected by configuration.
///
/// # Errors
///
/// Returns `StoreError::Unavailable` if the redis pool cannot be built.
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn MetricStore>, StoreError> {
    match config.backend {
        StoreBackend::Redis => {
            let store = RedisStore::new(&config.addr, &config.password, config.pool_size)?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store, history is lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}
