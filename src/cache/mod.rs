use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

use crate::error::ScrapeError;

pub mod events;
pub mod memory;
pub mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Хранилище строк с TTL. Реализация кеша внешняя по отношению к конвейеру.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, ScrapeError>;
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), ScrapeError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_header(self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

#[derive(Clone)]
pub struct CacheService {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl CacheService {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    // Ошибка чтения или разбора - это промах, а не ошибка запроса
    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let data = match self.store.get(key).await {
            Ok(Some(data)) => data,
            Ok(None) => return None,
            Err(e) => {
                warn!("Cache read failed for {}: {:?}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&data) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Cached value for {} is unreadable: {:?}", key, e);
                None
            }
        }
    }

    async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let data = match serde_json::to_string(value) {
            Ok(data) => data,
            Err(e) => {
                error!("Failed to serialize cache value for {}: {:?}", key, e);
                return;
            }
        };
        if let Err(e) = self.store.set(key, &data, self.ttl).await {
            error!("Failed to cache {}: {:?}", key, e);
        }
    }
}
