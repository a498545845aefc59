//! Redis cache layer
//!
//! Out-of-process listing cache, shared by every service instance pointed at
//! the same server. The connection is opened on first use and re-established
//! by the connection manager after it drops, so an outage shows up as
//! `CacheError::Unavailable` on the calls made during it.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client, RedisError};
use tokio::sync::OnceCell;
use tracing::debug;

use super::{CacheError, CacheLayer};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const CONNECT_RETRIES: usize = 1;

// == Redis Cache ==
pub struct RedisCache {
    client: Client,
    connection: OnceCell<ConnectionManager>,
}

impl RedisCache {
    /// Parses `url`, e.g. `redis://127.0.0.1:6379/0`. Nothing is dialed until
    /// the first call.
    pub fn new(url: &str) -> Result<Self, CacheError> {
        let client = Client::open(url)
            .map_err(|e| CacheError::Rejected(format!("invalid Redis URL: {}", e)))?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                debug!("Connecting to Redis");
                let config = ConnectionManagerConfig::new()
                    .set_connection_timeout(CONNECT_TIMEOUT)
                    .set_number_of_retries(CONNECT_RETRIES);
                self.client.get_connection_manager_with_config(config).await
            })
            .await
            .map_err(classify)?;
        Ok(manager.clone())
    }
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("connected", &self.connection.initialized())
            .finish()
    }
}

/// Transport failures mean the cache is unreachable; anything else is the
/// server refusing the command.
fn classify(err: RedisError) -> CacheError {
    if err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
    {
        CacheError::Unavailable(err.to_string())
    } else {
        CacheError::Rejected(err.to_string())
    }
}

#[async_trait]
impl CacheLayer for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.connection().await?;
        conn.get(key).await.map_err(classify)
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        let result: redis::RedisResult<()> = match ttl {
            // Redis expiries are whole seconds; round up so a short TTL
            // does not become "expire now"
            Some(ttl) => {
                let seconds = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
                conn.set_ex(key, value, seconds.max(1)).await
            }
            None => conn.set(key, value).await,
        };
        result.map_err(classify)
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        conn.del(key).await.map_err(classify)
    }
}
