//! Chromium через chromiumoxide.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use super::{BrowserLauncher, PageSnapshot, RenderSession, RenderedDocument};
use crate::config::BrowserConfig;
use crate::error::ScrapeError;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

// Видимый текст страницы и все ссылки с их заголовком и картинкой
const SNAPSHOT_SCRIPT: &str = r#"(() => {
    const anchors = Array.from(document.querySelectorAll('a[href]')).map(a => {
        const heading = a.querySelector('h1, h2, h3, h4, .title');
        const img = a.querySelector('img');
        return {
            href: a.getAttribute('href') || '',
            text: a.innerText || '',
            heading: heading ? heading.innerText : null,
            image: img ? img.src : null,
        };
    });
    return { text: document.body ? document.body.innerText : '', anchors };
})()"#;

/// Найти бинарник Chromium: явный путь, затем PATH.
/// `None` означает, что поиск остаётся за chromiumoxide.
pub fn find_chromium(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        warn!("CHROMIUM_PATH {:?} does not exist, falling back to PATH lookup", path);
    }

    ["google-chrome", "chromium", "chromium-browser"]
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// Запускает отдельный headless Chromium на каждую операцию.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    config: BrowserConfig,
}

impl ChromiumLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn RenderSession>, ScrapeError> {
        let mut builder = ChromeConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");
        if let Some(path) = find_chromium(self.config.chromium_path.as_deref()) {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(ScrapeError::BrowserLaunch)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::BrowserLaunch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler_task.abort();
                return Err(ScrapeError::BrowserLaunch(format!("failed to open page: {e}")));
            }
        };

        debug!("Chromium session started");
        Ok(Box::new(ChromiumSession {
            browser,
            page,
            handler_task,
            navigation_timeout: self.config.navigation_timeout(),
        }))
    }
}

pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    navigation_timeout: Duration,
}

impl ChromiumSession {
    /// Переход на `url` до DOMContentLoaded. Возвращает `true`, если
    /// время навигации истекло и работаем с тем, что успело загрузиться.
    async fn navigate(&self, url: &str) -> Result<bool, ScrapeError> {
        let started = Instant::now();

        match timeout(self.navigation_timeout, self.page.execute(NavigateParams::new(url))).await {
            Err(_) => {
                debug!("Navigation to {} timed out after {:?}", url, self.navigation_timeout);
                return Ok(true);
            }
            Ok(Err(e)) => {
                return Err(ScrapeError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
            Ok(Ok(response)) => {
                if let Some(error_text) = response.result.error_text.as_ref() {
                    return Err(ScrapeError::Navigation {
                        url: url.to_string(),
                        message: error_text.clone(),
                    });
                }
            }
        }

        let remaining = self.navigation_timeout.saturating_sub(started.elapsed());
        let parsed = timeout(remaining, async {
            while self.ready_state().await.as_deref() == Some("loading") {
                sleep(POLL_INTERVAL).await;
            }
        })
        .await;

        if parsed.is_err() {
            debug!("DOM of {} still loading after {:?}", url, self.navigation_timeout);
            return Ok(true);
        }
        Ok(false)
    }

    async fn ready_state(&self) -> Option<String> {
        self.page
            .evaluate("document.readyState")
            .await
            .ok()
            .and_then(|result| result.into_value::<String>().ok())
    }

    async fn wait_for_selector(&self, selector: &str, limit: Duration) -> bool {
        let probe = match serde_json::to_string(selector) {
            Ok(quoted) => format!("document.querySelector({quoted}) !== null"),
            Err(_) => return false,
        };

        timeout(limit, async {
            loop {
                let found = self
                    .page
                    .evaluate(probe.as_str())
                    .await
                    .ok()
                    .and_then(|result| result.into_value::<bool>().ok())
                    .unwrap_or(false);
                if found {
                    break;
                }
                sleep(POLL_INTERVAL).await;
            }
        })
        .await
        .is_ok()
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn render(
        &mut self,
        url: &str,
        wait_for: Option<&str>,
        limit: Duration,
    ) -> Result<RenderedDocument, ScrapeError> {
        let navigation_timed_out = self.navigate(url).await?;

        let selector_found = match wait_for {
            Some(selector) => {
                let found = self.wait_for_selector(selector, limit).await;
                debug!("Selector '{}' on {}: found = {}", selector, url, found);
                Some(found)
            }
            None => None,
        };

        let html = self
            .page
            .content()
            .await
            .map_err(|e| ScrapeError::Evaluation(e.to_string()))?;
        let snapshot: PageSnapshot = self
            .page
            .evaluate(SNAPSHOT_SCRIPT)
            .await
            .map_err(|e| ScrapeError::Evaluation(e.to_string()))?
            .into_value()
            .map_err(|e| ScrapeError::Evaluation(format!("unexpected snapshot shape: {e}")))?;

        let mut document = RenderedDocument::from_snapshot(url, html, snapshot);
        document.selector_found = selector_found;
        document.navigation_timed_out = navigation_timed_out;
        Ok(document)
    }

    async fn close(self: Box<Self>) {
        let ChromiumSession {
            mut browser,
            page,
            handler_task,
            ..
        } = *self;

        let _ = page.close().await;
        if let Err(e) = browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        let _ = browser.wait().await;
        handler_task.abort();
        info!("Chromium session closed");
    }
}
