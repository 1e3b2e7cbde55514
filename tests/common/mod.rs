#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use event_scraper::cache::{CacheService, MemoryStore};
use event_scraper::config::SiteConfig;
use event_scraper::error::ScrapeError;
use event_scraper::renderer::{BrowserLauncher, RenderSession, RenderedDocument};
use event_scraper::services::EventService;

pub const LISTING_URL: &str = "https://skillbloomer.com/events/";

pub fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("missing fixture {path}: {e}"))
}

pub fn detail_url(slug: &str) -> String {
    format!("{LISTING_URL}{slug}")
}

#[derive(Clone)]
pub enum Page {
    Html(String),
    Fail,
}

#[derive(Default)]
pub struct Stats {
    pub launches: AtomicUsize,
    pub renders: AtomicUsize,
    pub closes: AtomicUsize,
}

impl Stats {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

/// Браузер, отдающий записанный HTML по адресу страницы.
#[derive(Clone, Default)]
pub struct FixtureLauncher {
    pages: Arc<HashMap<String, Page>>,
    pub stats: Arc<Stats>,
    fail_launch: bool,
    selector_missing: bool,
}

impl FixtureLauncher {
    pub fn new(pages: Vec<(String, Page)>) -> Self {
        Self {
            pages: Arc::new(pages.into_iter().collect()),
            stats: Arc::new(Stats::default()),
            fail_launch: false,
            selector_missing: false,
        }
    }

    /// Ожидание селектора на каждой странице заканчивается таймаутом.
    pub fn selector_never_appears(mut self) -> Self {
        self.selector_missing = true;
        self
    }

    pub fn failing() -> Self {
        Self {
            fail_launch: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl BrowserLauncher for FixtureLauncher {
    async fn launch(&self) -> Result<Box<dyn RenderSession>, ScrapeError> {
        self.stats.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail_launch {
            return Err(ScrapeError::BrowserLaunch("chromium not installed".into()));
        }
        Ok(Box::new(FixtureSession {
            pages: Arc::clone(&self.pages),
            stats: Arc::clone(&self.stats),
            selector_missing: self.selector_missing,
        }))
    }
}

pub struct FixtureSession {
    pages: Arc<HashMap<String, Page>>,
    stats: Arc<Stats>,
    selector_missing: bool,
}

impl FixtureSession {
    pub fn new(pages: Vec<(String, Page)>) -> Self {
        Self {
            pages: Arc::new(pages.into_iter().collect()),
            stats: Arc::new(Stats::default()),
            selector_missing: false,
        }
    }

    pub fn selector_never_appears(mut self) -> Self {
        self.selector_missing = true;
        self
    }
}

#[async_trait]
impl RenderSession for FixtureSession {
    async fn render(
        &mut self,
        url: &str,
        wait_for: Option<&str>,
        _timeout: Duration,
    ) -> Result<RenderedDocument, ScrapeError> {
        self.stats.renders.fetch_add(1, Ordering::SeqCst);
        match self.pages.get(url) {
            Some(Page::Html(html)) => {
                let mut document = RenderedDocument::from_html(url, html);
                document.selector_found = wait_for.map(|_| !self.selector_missing);
                Ok(document)
            }
            Some(Page::Fail) | None => Err(ScrapeError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_RESET".into(),
            }),
        }
    }

    async fn close(self: Box<Self>) {
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn memory_cache() -> (CacheService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let cache = CacheService::new(store.clone(), Duration::from_secs(3600));
    (cache, store)
}

pub fn service(launcher: FixtureLauncher, cache: CacheService) -> EventService {
    EventService::new(
        cache,
        Arc::new(launcher),
        SiteConfig::default(),
        Duration::from_millis(10),
    )
}

/// Список с тремя карточками и страницы всех трёх событий.
pub fn full_site() -> Vec<(String, Page)> {
    vec![
        (LISTING_URL.to_string(), Page::Html(fixture("listing.html"))),
        (detail_url("run-for-education"), Page::Html(fixture("detail.html"))),
        (detail_url("online-webinar"), Page::Html(fixture("detail_sparse.html"))),
        (detail_url("tree-plantation"), Page::Html(fixture("detail_sparse.html"))),
    ]
}
