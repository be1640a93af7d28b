use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::{Expiry, future::Cache as MokaCache};

use super::{CacheError, CacheStore};

/// Expires each entry after the TTL it was written with.
struct EntryTtl;

impl Expiry<String, (String, Duration)> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &(String, Duration),
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.1)
    }
}

/// In-process cache used when no redis URL is configured.
#[derive(Clone)]
pub struct MemoryCache {
    inner: MokaCache<String, (String, Duration)>,
}

impl MemoryCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: MokaCache::builder()
                .max_capacity(max_capacity)
                .expire_after(EntryTtl)
                .build(),
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.inner.get(key).await.map(|(value, _)| value))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.inner.insert(key.to_string(), (value, ttl)).await;
        Ok(())
    }

    async fn delete(&self, keys: &[&str]) -> Result<(), CacheError> {
        for key in keys {
            self.inner.invalidate(*key).await;
        }
        Ok(())
    }
}
