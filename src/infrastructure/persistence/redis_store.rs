use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Config, Connection, Pool, PoolConfig, Runtime};
use redis::{AsyncCommands, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};

use crate::domain::ports::store::{MetricStore, StoreError};

/// Redis-backed store sharing one bounded connection pool across all tasks.
///
/// Commands run with the pool's default timeouts; nothing is retried.
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    /// Build the pool. No connection is opened until the first command.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the address is malformed or the
    /// pool cannot be created.
    pub fn new(addr: &str, password: &str, pool_size: usize) -> Result<Self, StoreError> {
        let (host, port) = parse_addr(addr)?;
        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(host, port),
            redis: RedisConnectionInfo {
                password: (!password.is_empty()).then(|| password.to_string()),
                ..RedisConnectionInfo::default()
            },
        };
        let mut config = Config::from_connection_info(info);
        config.pool = Some(PoolConfig::new(pool_size.max(1)));
        let pool = config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::Unavailable(format!("cannot create pool: {e}")))?;
        Ok(Self { pool })
    }

    async fn conn(&self) -> Result<Connection, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

fn parse_addr(addr: &str) -> Result<(String, u16), StoreError> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| StoreError::Unavailable(format!("address '{addr}' has no port")))?;
    let port = port
        .parse::<u16>()
        .map_err(|_| StoreError::Unavailable(format!("invalid port in '{addr}'")))?;
    // IPv6 literals come bracketed, e.g. `[::1]:6379`.
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if host.is_empty() {
        return Err(StoreError::Unavailable(format!("address '{addr}' has no host")));
    }
    Ok((host.to_string(), port))
}

fn read_err(e: &redis::RedisError) -> StoreError {
    StoreError::ReadFailed(e.to_string())
}

fn write_err(e: &redis::RedisError) -> StoreError {
    StoreError::WriteFailed(e.to_string())
}

#[async_trait]
impl MetricStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn().await?;
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| read_err(&e))
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        // SET EX rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(|e| write_err(&e))
    }

    async fn push_back(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        conn.rpush::<_, _, ()>(key, value)
            .await
            .map_err(|e| write_err(&e))
    }

    async fn trim_to_last(&self, key: &str, keep: usize) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        if keep == 0 {
            return conn.del::<_, ()>(key).await.map_err(|e| write_err(&e));
        }
        let start = isize::try_from(keep).map_or(isize::MIN, |k| -k);
        conn.ltrim::<_, ()>(key, start, -1)
            .await
            .map_err(|e| write_err(&e))
    }

    async fn range_all(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn().await?;
        conn.lrange::<_, Vec<String>>(key, 0, -1)
            .await
            .map_err(|e| read_err(&e))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        let _pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }
}
