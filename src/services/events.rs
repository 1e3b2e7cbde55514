//! Операции верхнего уровня: список событий и страница события.
//!
//! Каждая операция сначала смотрит в кеш. При промахе запускается один
//! браузер на всю операцию; он закрывается на любом пути выхода, после
//! чего результат кладётся в кеш. Обогащение списка идёт строго по одному
//! событию, без параллельных страниц.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::cache::{CacheService, CacheStatus};
use crate::config::SiteConfig;
use crate::error::ScrapeError;
use crate::models::{EventDetail, EventSummary};
use crate::renderer::{BrowserLauncher, RenderSession};
use crate::scraping::{
    apply_fallback, enrich_summaries, extract_detail, extract_listing, DetailOutcome,
    DetailProvider, SessionDetails,
};

/// Значение вместе с тем, откуда оно взялось.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub value: T,
    pub cache: CacheStatus,
}

#[derive(Clone)]
pub struct EventService {
    cache: CacheService,
    launcher: Arc<dyn BrowserLauncher>,
    site: SiteConfig,
    selector_timeout: Duration,
}

impl EventService {
    pub fn new(
        cache: CacheService,
        launcher: Arc<dyn BrowserLauncher>,
        site: SiteConfig,
        selector_timeout: Duration,
    ) -> Self {
        Self {
            cache,
            launcher,
            site,
            selector_timeout,
        }
    }

    /// Список событий. Ошибкой завершается только запуск браузера.
    #[instrument(skip(self), fields(run_id = %Uuid::new_v4()))]
    pub async fn list_events(&self) -> Result<Fetched<Vec<EventSummary>>, ScrapeError> {
        if let Some(events) = self.cache.get_events_list().await {
            info!("Serving {} events from cache", events.len());
            return Ok(Fetched {
                value: events,
                cache: CacheStatus::Hit,
            });
        }

        let mut session = self.launcher.launch().await?;
        let scraped = self.scrape_list(session.as_mut()).await;
        session.close().await;

        let events = apply_fallback(scraped);
        self.cache.save_events_list(&events).await;
        info!("Scraped {} events", events.len());

        Ok(Fetched {
            value: events,
            cache: CacheStatus::Miss,
        })
    }

    /// Страница события. Деградировавшая запись отдаётся, но не кешируется.
    #[instrument(skip(self), fields(run_id = %Uuid::new_v4()))]
    pub async fn event_detail(&self, slug: &str) -> Result<Fetched<EventDetail>, ScrapeError> {
        if let Some(detail) = self.cache.get_event_detail(slug).await {
            return Ok(Fetched {
                value: detail,
                cache: CacheStatus::Hit,
            });
        }

        let mut session = self.launcher.launch().await?;
        let outcome = extract_detail(session.as_mut(), slug, &self.site, self.selector_timeout).await;
        session.close().await;

        match &outcome {
            DetailOutcome::Full(detail) => self.cache.save_event_detail(slug, detail).await,
            DetailOutcome::Degraded { reason, .. } => {
                warn!("Serving degraded detail for {} ({:?}), not caching", slug, reason)
            }
        }

        Ok(Fetched {
            value: outcome.into_detail(),
            cache: CacheStatus::Miss,
        })
    }

    async fn scrape_list(&self, session: &mut dyn RenderSession) -> Vec<EventSummary> {
        let events = match extract_listing(&mut *session, &self.site, self.selector_timeout).await {
            Ok(events) => events,
            Err(e) => {
                warn!(kind = ?e.kind(), "Listing page failed: {}", e);
                Vec::new()
            }
        };

        let mut details = CachedDetails {
            cache: &self.cache,
            inner: SessionDetails::new(session, &self.site, self.selector_timeout),
        };
        enrich_summaries(events, &mut details).await
    }
}

/// Страницы событий для обогащения: сначала кеш, затем браузер.
/// Полные страницы, полученные по пути, сохраняются в кеш.
struct CachedDetails<'a> {
    cache: &'a CacheService,
    inner: SessionDetails<'a>,
}

#[async_trait]
impl<'a> DetailProvider for CachedDetails<'a> {
    async fn detail(&mut self, slug: &str) -> DetailOutcome {
        if let Some(detail) = self.cache.get_event_detail(slug).await {
            return DetailOutcome::Full(detail);
        }

        let outcome = self.inner.detail(slug).await;
        if let DetailOutcome::Full(detail) = &outcome {
            self.cache.save_event_detail(slug, detail).await;
        }
        outcome
    }
}
