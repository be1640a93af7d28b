//! Read-through cache for list views.
//!
//! The cache is a side store: a [`Cache`] never fails its caller. Backend
//! errors are logged and reads degrade to misses, so the database stays the
//! only source of truth.

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

pub mod keys;
mod memory;
mod redis_store;

pub use keys::FinanceEntity;
pub use memory::MemoryCache;
pub use redis_store::RedisCache;

/// Default time-to-live of cached lists.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("cache operation timed out")]
    Timeout,
}

/// Key-value backend holding serialized values.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
    async fn delete(&self, keys: &[&str]) -> Result<(), CacheError>;
}

/// Best-effort handle shared by the engine and the HTTP layer.
#[derive(Clone)]
pub struct Cache {
    store: Option<Arc<dyn CacheStore>>,
    ttl: Duration,
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("enabled", &self.store.is_some())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::disabled()
    }
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            store: Some(store),
            ttl,
        }
    }

    /// A cache that always misses.
    pub fn disabled() -> Self {
        Self {
            store: None,
            ttl: DEFAULT_TTL,
        }
    }

    /// In-process cache with the given TTL.
    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(Arc::new(MemoryCache::new(10_000)), ttl)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let store = self.store.as_ref()?;
        let raw = match store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key, "cache miss");
                return None;
            }
            Err(err) => {
                tracing::warn!(key, "cache read failed: {err}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => {
                tracing::debug!(key, "cache hit");
                Some(value)
            }
            Err(err) => {
                tracing::warn!(key, "discarding undecodable cache entry: {err}");
                self.invalidate(&[key]).await;
                None
            }
        }
    }

    pub async fn put_json<T: Serialize>(&self, key: &str, value: &T) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(key, "cache value not serializable: {err}");
                return;
            }
        };
        if let Err(err) = store.set(key, raw, self.ttl).await {
            tracing::warn!(key, "cache write failed: {err}");
        }
    }

    pub async fn invalidate(&self, keys: &[&str]) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        if keys.is_empty() {
            return;
        }
        match store.delete(keys).await {
            Ok(()) => tracing::debug!(?keys, "cache invalidated"),
            Err(err) => tracing::warn!(?keys, "cache invalidation failed: {err}"),
        }
    }

    /// `true` when `key` currently holds a value.
    pub async fn contains(&self, key: &str) -> bool {
        match self.store.as_ref() {
            Some(store) => matches!(store.get(key).await, Ok(Some(_))),
            None => false,
        }
    }
}
