use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use super::detail::{extract_detail, DetailOutcome};
use crate::config::SiteConfig;
use crate::models::{EventDetail, EventSummary};
use crate::renderer::RenderSession;

const MIN_LOCATION_LEN: usize = 3;
const MIN_TIME_LEN: usize = 2;

/// Источник страниц событий для обогащения списка.
#[async_trait]
pub trait DetailProvider: Send {
    async fn detail(&mut self, slug: &str) -> DetailOutcome;
}

/// Берёт страницы событий из уже открытой сессии браузера.
pub struct SessionDetails<'a> {
    session: &'a mut dyn RenderSession,
    site: &'a SiteConfig,
    selector_timeout: Duration,
}

impl<'a> SessionDetails<'a> {
    pub fn new(
        session: &'a mut dyn RenderSession,
        site: &'a SiteConfig,
        selector_timeout: Duration,
    ) -> Self {
        Self {
            session,
            site,
            selector_timeout,
        }
    }
}

#[async_trait]
impl<'a> DetailProvider for SessionDetails<'a> {
    async fn detail(&mut self, slug: &str) -> DetailOutcome {
        extract_detail(&mut *self.session, slug, self.site, self.selector_timeout).await
    }
}

/// Переносит место и время со страницы события, если они содержательнее.
pub fn merge_detail(mut summary: EventSummary, detail: &EventDetail) -> EventSummary {
    if detail.location.chars().count() > MIN_LOCATION_LEN {
        summary.location = detail.location.clone();
    }
    if detail.time.chars().count() > MIN_TIME_LEN {
        summary.time = detail.time.clone();
    }
    summary
}

/// Обогащает карточки по одной, строго последовательно. Деградировавшая
/// страница оставляет карточку как есть и не влияет на остальные.
pub async fn enrich_summaries<P>(summaries: Vec<EventSummary>, provider: &mut P) -> Vec<EventSummary>
where
    P: DetailProvider + ?Sized,
{
    let mut enriched = Vec::with_capacity(summaries.len());

    for summary in summaries {
        match provider.detail(&summary.slug).await {
            DetailOutcome::Full(detail) => {
                debug!("Enriched {} with location '{}'", summary.slug, detail.location);
                enriched.push(merge_detail(summary, &detail));
            }
            DetailOutcome::Degraded { reason, .. } => {
                warn!("Failed to enrich event {}: {:?}", summary.slug, reason);
                enriched.push(summary);
            }
        }
    }

    enriched
}
