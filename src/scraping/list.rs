use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{truncate_chars, PLACEHOLDER_IMAGE};
use crate::config::SiteConfig;
use crate::error::ScrapeError;
use crate::models::EventSummary;
use crate::renderer::{Anchor, RenderSession};

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").expect("year regex"));
static WEEKDAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Sun|Mon|Tue|Wed|Thu|Fri|Sat").expect("weekday regex"));
static DAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(Sun|Mon|Tue|Wed|Thu|Fri|Sat)").expect("day regex"));

const DEFAULT_LOCATION: &str = "Online";
const UPCOMING: &str = "Upcoming";
const UNKNOWN_DAY: &str = "TBA";
const DEFAULT_CATEGORY: &str = "Event";
const DEFAULT_INTERESTED: &str = "50+";
const DEFAULT_TIME: &str = "10:00 AM - 5:00 PM";
const SHORT_DATE_LEN: usize = 6;
// Карточки, в которых строк меньше, не содержат место проведения
const POSITIONAL_MIN_LINES: usize = 5;

/// Поля, выведенные из строк текста карточки.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFields {
    pub long_date: String,
    pub date_short: String,
    pub day: String,
    pub location: String,
}

/// Строка с датой: есть год, дефис или сокращение дня недели.
pub fn is_date_line(line: &str) -> bool {
    YEAR_RE.is_match(line) || line.contains('-') || WEEKDAY_RE.is_match(line)
}

/// Разбор строк карточки. Обычно они выглядят так:
/// `["22", "MAR", "Sun, 22 Mar - 22 Mar, 2026", "Hyderabad", "Run for Education"]`.
pub fn parse_card(lines: &[String]) -> CardFields {
    let date_index = lines.iter().position(|line| is_date_line(line));
    let long_date = date_index
        .map(|i| lines[i].replace('\n', " "))
        .unwrap_or_else(|| UPCOMING.to_string());
    let short_of_long = || match date_index {
        Some(_) => truncate_chars(&long_date, SHORT_DATE_LEN).trim_end().to_string(),
        // Без строки даты короткая дата тоже "Upcoming", а не его обрезок
        None => UPCOMING.to_string(),
    };

    let (date_short, location) = match date_index {
        Some(i) if lines.len() >= POSITIONAL_MIN_LINES => {
            let location = lines
                .get(i + 1)
                .cloned()
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string());
            let date_short = if i >= 2 {
                format!("{} {}", lines[i - 2], lines[i - 1])
            } else {
                short_of_long()
            };
            (date_short, location)
        }
        _ => (short_of_long(), DEFAULT_LOCATION.to_string()),
    };

    let day = DAY_RE
        .captures(&long_date)
        .and_then(|caps| caps.get(1))
        .map(|m| capitalize(m.as_str()))
        .unwrap_or_else(|| UNKNOWN_DAY.to_string());

    CardFields {
        long_date,
        date_short,
        day,
        location,
    }
}

/// Slug события из href ссылки: последний непустой сегмент пути.
/// `None` для ссылок на саму страницу списка и для чужих ссылок.
pub fn slug_from_href(href: &str, site: &SiteConfig) -> Option<String> {
    let pattern = site.events_pattern();
    let href = href.trim();
    if !href.contains(&pattern) {
        return None;
    }

    let path = href.split(['?', '#']).next().unwrap_or_default();
    let listing = site.listing_url();
    if path == pattern || path == listing || path == listing.trim_end_matches('/') {
        return None;
    }

    let slug = path.split('/').filter(|segment| !segment.is_empty()).last()?;
    let listing_segment = site.events_path.trim_matches('/');
    if slug == "events" || slug == listing_segment || !is_url_safe(slug) {
        return None;
    }
    Some(slug.to_string())
}

/// Непустой slug из unreserved-символов. "." и ".." отбрасываются:
/// в адресе это сегменты пути, а не имя события.
pub fn is_url_safe(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.chars().all(|c| c == '.')
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~' | '%'))
}

/// Разбор ссылок страницы списка. Порядок результата - порядок первого
/// появления slug; повторная ссылка с тем же slug перезаписывает запись.
pub fn parse_listing(anchors: &[Anchor], site: &SiteConfig) -> Vec<EventSummary> {
    let mut events: Vec<EventSummary> = Vec::new();
    let mut by_slug: HashMap<String, usize> = HashMap::new();

    for anchor in anchors {
        let Some(slug) = slug_from_href(&anchor.href, site) else {
            continue;
        };
        let summary = summarize(anchor, slug, site);

        match by_slug.get(&summary.slug) {
            Some(&index) => {
                debug!("Duplicate card for {}, keeping the later one", summary.slug);
                events[index] = summary;
            }
            None => {
                by_slug.insert(summary.slug.clone(), events.len());
                events.push(summary);
            }
        }
    }

    events
}

fn summarize(anchor: &Anchor, slug: String, site: &SiteConfig) -> EventSummary {
    let card = parse_card(&anchor.lines);

    let title = anchor
        .heading
        .clone()
        .filter(|heading| !heading.trim().is_empty())
        .or_else(|| Some(anchor.lines.join(" ")).filter(|text| !text.is_empty()))
        .unwrap_or_else(|| slug.replace('-', " "));

    let image = anchor
        .image
        .clone()
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());

    EventSummary {
        booking_url: site.booking_url(&slug),
        title,
        image,
        date_short: card.date_short,
        long_date: card.long_date,
        day: card.day,
        location: card.location,
        category: DEFAULT_CATEGORY.to_string(),
        interested: DEFAULT_INTERESTED.to_string(),
        time: DEFAULT_TIME.to_string(),
        tickets_available: true,
        slug,
    }
}

/// Отрендерить страницу списка и разобрать карточки.
pub async fn extract_listing(
    session: &mut dyn RenderSession,
    site: &SiteConfig,
    selector_timeout: Duration,
) -> Result<Vec<EventSummary>, ScrapeError> {
    let listing_url = site.listing_url();
    let wait_for = format!("a[href*=\"{}\"]", site.events_pattern());

    let document = session
        .render(&listing_url, Some(&wait_for), selector_timeout)
        .await?;
    if let Some(kind) = document.partial_reason() {
        warn!(
            kind = ?kind,
            "Listing page {} may be incomplete, parsing what rendered",
            listing_url
        );
    }
    let events = parse_listing(&document.anchors, site);

    info!(
        "Parsed {} event cards from {} anchors on {}",
        events.len(),
        document.anchors.len(),
        listing_url
    );
    Ok(events)
}

fn capitalize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
