pub mod cache;
pub mod config;
pub mod controllers;
pub mod error;
pub mod models;
pub mod renderer;
pub mod scraping;
pub mod services;

use anyhow::Context;
use std::sync::Arc;

use cache::{CacheService, CacheStore, MemoryStore, RedisStore};
use config::{CacheBackend, Config};
use renderer::ChromiumLauncher;
use services::EventService;

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub events: EventService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let store: Arc<dyn CacheStore> = match config.cache.backend {
            CacheBackend::Memory => Arc::new(MemoryStore::new()),
            CacheBackend::Redis => {
                let url = config
                    .cache
                    .redis_url
                    .as_deref()
                    .context("REDIS_URL must be set")?;
                let redis = RedisStore::connect(url)
                    .await
                    .context("Failed to connect to Redis")?;
                Arc::new(redis)
            }
        };
        let cache = CacheService::new(store, config.cache.ttl());

        let launcher = Arc::new(ChromiumLauncher::new(config.browser.clone()));
        let events = EventService::new(
            cache,
            launcher,
            config.site.clone(),
            config.browser.selector_timeout(),
        );

        Ok(Self::with_service(config, events))
    }

    /// Состояние с готовым сервисом (тесты подставляют свой браузер и кеш).
    pub fn with_service(config: Config, events: EventService) -> Arc<Self> {
        Arc::new(Self { config, events })
    }
}
