use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::warn;
use url::Url;

use super::{truncate_chars, PLACEHOLDER_IMAGE};
use crate::config::SiteConfig;
use crate::error::FailureKind;
use crate::models::{EventDetail, Organizer};
use crate::renderer::{absolute_url, inner_text, text_lines, RenderSession, RenderedDocument};

/// Селектор, которого ждём на странице события.
pub const PRIMARY_HEADING: &str = "h1";

const DESCRIPTION_LIMIT: usize = 500;

const DATE_FALLBACK: &str = "Check website for details";
const TIME_FALLBACK: &str = "Check website for time";
const LOCATION_FALLBACK: &str = "Location details on website";
const DESCRIPTION_FALLBACK: &str =
    "Join us for this wonderful event. Visit the official page for full details.";
const TICKETS_AVAILABLE: &str = "Available via Skillbloomer";
const TICKET_PRICE: &str = "See Booking Page";
const ORGANIZER_NAME: &str = "Skillbloomer Organization";
const ORGANIZER_IMAGE: &str =
    "https://images.unsplash.com/photo-1560250097-0b93528c311a?w=100&auto=format&fit=crop&q=60";
const ORGANIZER_BIO: &str = "Empowering communities through impactful events.";
const DEFAULT_TAGS: [&str; 3] = ["Education", "Community", "Empowerment"];

// Значения для страницы, которую не удалось открыть
const DEGRADED_SCHEDULE: &str = "See Website";
const DEGRADED_LOCATION: &str = "Check Event Page";
const DEGRADED_IMAGE: &str = "https://images.unsplash.com/photo-1542838132-92c53300491e?w=800";
const DEGRADED_DESCRIPTION: &str = "Details for this event could not be fully loaded. \
     Please visit the event page directly to learn more and book your spot.";

static DATE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:Date|When):\s*").expect("date label regex"));
static TIME_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:Time|Starts At):\s*").expect("time label regex"));
static VENUE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:Venue|Location):\s*").expect("venue label regex"));

static TITLE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| selectors(&["h1", "h2"]));
static IMAGE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&["img.wp-post-image", ".hero img", "article img", "img"])
});
static DESCRIPTION_SELECTORS: Lazy<Vec<Selector>> =
    Lazy::new(|| selectors(&[".event-description", "article", ".content"]));

fn selectors(raw: &[&str]) -> Vec<Selector> {
    raw.iter()
        .map(|s| Selector::parse(s).expect("static detail selector"))
        .collect()
}

/// Результат извлечения страницы события: полная запись или запись,
/// собранная только из slug, с причиной деградации.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    Full(EventDetail),
    Degraded {
        detail: EventDetail,
        reason: FailureKind,
    },
}

impl DetailOutcome {
    pub fn detail(&self) -> &EventDetail {
        match self {
            DetailOutcome::Full(detail) => detail,
            DetailOutcome::Degraded { detail, .. } => detail,
        }
    }

    pub fn into_detail(self) -> EventDetail {
        match self {
            DetailOutcome::Full(detail) => detail,
            DetailOutcome::Degraded { detail, .. } => detail,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, DetailOutcome::Degraded { .. })
    }
}

/// "my-event" -> "MY EVENT"
pub fn title_from_slug(slug: &str) -> String {
    slug.replace('-', " ").to_uppercase()
}

/// Остаток первой строки, начинающейся с метки. Пустой остаток не считается.
pub fn labeled_value(lines: &[String], label: &Regex) -> Option<String> {
    let line = lines.iter().find(|line| label.is_match(line))?;
    let value = label.replace(line, "").trim().to_string();
    (!value.is_empty()).then_some(value)
}

pub fn truncate_description(text: &str) -> String {
    format!("{}...", truncate_chars(text, DESCRIPTION_LIMIT))
}

/// Разбор отрендеренной страницы события.
pub fn parse_detail(slug: &str, document: &RenderedDocument, site: &SiteConfig) -> EventDetail {
    let html = Html::parse_document(&document.html);
    let base = Url::parse(&document.url).ok();

    let title = TITLE_SELECTORS
        .iter()
        .find_map(|selector| html.select(selector).next())
        .map(inner_text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| title_from_slug(slug));

    let image = IMAGE_SELECTORS
        .iter()
        .flat_map(|selector| html.select(selector))
        .filter_map(|img| img.value().attr("src"))
        .find_map(|src| absolute_url(base.as_ref(), src))
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());

    let description = DESCRIPTION_SELECTORS
        .iter()
        .flat_map(|selector| html.select(selector))
        .map(|el| text_lines(el).join("\n"))
        .find(|text| !text.is_empty())
        .map(|text| truncate_description(&text))
        .unwrap_or_else(|| DESCRIPTION_FALLBACK.to_string());

    let lines = &document.lines;
    EventDetail {
        title,
        image,
        date: labeled_value(lines, &DATE_LABEL).unwrap_or_else(|| DATE_FALLBACK.to_string()),
        time: labeled_value(lines, &TIME_LABEL).unwrap_or_else(|| TIME_FALLBACK.to_string()),
        location: labeled_value(lines, &VENUE_LABEL)
            .unwrap_or_else(|| LOCATION_FALLBACK.to_string()),
        description,
        tickets_available: TICKETS_AVAILABLE.to_string(),
        ticket_price: TICKET_PRICE.to_string(),
        organizer: default_organizer(),
        tags: default_tags(),
        booking_url: site.booking_url(slug),
    }
}

/// Запись для страницы, которую не удалось загрузить.
pub fn degraded_detail(slug: &str, site: &SiteConfig) -> EventDetail {
    EventDetail {
        title: title_from_slug(slug),
        image: DEGRADED_IMAGE.to_string(),
        date: DEGRADED_SCHEDULE.to_string(),
        time: DEGRADED_SCHEDULE.to_string(),
        location: DEGRADED_LOCATION.to_string(),
        description: DEGRADED_DESCRIPTION.to_string(),
        tickets_available: TICKETS_AVAILABLE.to_string(),
        ticket_price: TICKET_PRICE.to_string(),
        organizer: default_organizer(),
        tags: default_tags(),
        booking_url: site.booking_url(slug),
    }
}

/// Отрендерить страницу события и разобрать её. Никогда не возвращает
/// ошибку: сбой навигации превращается в `DetailOutcome::Degraded`.
pub async fn extract_detail(
    session: &mut dyn RenderSession,
    slug: &str,
    site: &SiteConfig,
    selector_timeout: Duration,
) -> DetailOutcome {
    let url = site.detail_url(slug);

    match session
        .render(&url, Some(PRIMARY_HEADING), selector_timeout)
        .await
    {
        Ok(document) => {
            if let Some(kind) = document.partial_reason() {
                warn!(kind = ?kind, "Detail page for {} may be incomplete", slug);
            }
            DetailOutcome::Full(parse_detail(slug, &document, site))
        }
        Err(e) => {
            warn!("Scrape detail error for {}: {}", slug, e);
            DetailOutcome::Degraded {
                detail: degraded_detail(slug, site),
                reason: e.kind(),
            }
        }
    }
}

fn default_organizer() -> Organizer {
    Organizer {
        name: ORGANIZER_NAME.to_string(),
        image: ORGANIZER_IMAGE.to_string(),
        bio: ORGANIZER_BIO.to_string(),
    }
}

fn default_tags() -> Vec<String> {
    DEFAULT_TAGS.iter().map(|tag| tag.to_string()).collect()
}
