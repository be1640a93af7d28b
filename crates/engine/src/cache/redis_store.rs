use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use tokio::time::timeout;

use super::{CacheError, CacheStore};

/// Per-operation bound so a slow redis never stalls a request.
const OP_TIMEOUT: Duration = Duration::from_millis(250);

/// Redis backed cache sharing one multiplexed connection.
#[derive(Clone)]
pub struct RedisCache {
    connection: MultiplexedConnection,
}

impl RedisCache {
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        let connection = timeout(OP_TIMEOUT * 8, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| CacheError::Timeout)??;
        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut connection = self.connection.clone();
        let value: Option<String> = timeout(OP_TIMEOUT, connection.get(key))
            .await
            .map_err(|_| CacheError::Timeout)??;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        let _: () = timeout(OP_TIMEOUT, connection.set_ex(key, value, ttl.as_secs().max(1)))
            .await
            .map_err(|_| CacheError::Timeout)??;
        Ok(())
    }

    async fn delete(&self, keys: &[&str]) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        let _: i64 = timeout(OP_TIMEOUT, connection.del(keys))
            .await
            .map_err(|_| CacheError::Timeout)??;
        Ok(())
    }
}
