//! Рендеринг страниц через headless-браузер.
//!
//! Конвейер не знает о конкретном движке: он получает сессию через
//! `BrowserLauncher`, рендерит в ней страницы и закрывает её. В тестах
//! вместо Chromium подставляется сессия, отдающая заранее записанный HTML.

pub mod chromium;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::error::{FailureKind, ScrapeError};

pub use chromium::ChromiumLauncher;

static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("body selector"));
static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("anchor selector"));
static CARD_HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, .title").expect("card heading selector"));
static IMAGE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img").expect("image selector"));

// Элементы, которые в innerText начинают новую строку
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "details", "dialog", "div",
    "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4",
    "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary",
    "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Ссылка на отрендеренной странице.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    /// Видимый текст ссылки, построчно, без пустых строк.
    pub lines: Vec<String>,
    /// Текст первого заголовка внутри ссылки.
    pub heading: Option<String>,
    /// Абсолютный адрес первой картинки внутри ссылки.
    pub image: Option<String>,
}

/// Снимок страницы после рендеринга.
#[derive(Debug, Clone, Default)]
pub struct RenderedDocument {
    pub url: String,
    pub html: String,
    pub lines: Vec<String>,
    pub anchors: Vec<Anchor>,
    /// `None`, если ожидание селектора не запрашивалось.
    pub selector_found: Option<bool>,
    pub navigation_timed_out: bool,
}

/// Одна сессия браузера на одну операцию верхнего уровня.
#[async_trait]
pub trait RenderSession: Send {
    /// Открыть `url`, дождаться DOMContentLoaded и, если задан `wait_for`,
    /// подождать селектор не дольше `timeout`. Таймаут ожидания не ошибка.
    async fn render(
        &mut self,
        url: &str,
        wait_for: Option<&str>,
        timeout: Duration,
    ) -> Result<RenderedDocument, ScrapeError>;

    /// Освободить браузер. Ошибки закрытия только логируются.
    async fn close(self: Box<Self>);
}

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn RenderSession>, ScrapeError>;
}

/// То, что возвращает скрипт снимка внутри страницы.
#[derive(Debug, Deserialize)]
pub(crate) struct PageSnapshot {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub anchors: Vec<SnapshotAnchor>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SnapshotAnchor {
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub text: String,
    pub heading: Option<String>,
    pub image: Option<String>,
}

impl RenderedDocument {
    /// Построить документ из статической разметки (без JavaScript).
    pub fn from_html(url: &str, html: &str) -> Self {
        let document = Html::parse_document(html);
        let base = Url::parse(url).ok();

        let lines = document
            .select(&BODY_SELECTOR)
            .next()
            .map(text_lines)
            .unwrap_or_default();

        let anchors = document
            .select(&ANCHOR_SELECTOR)
            .map(|anchor| Anchor {
                href: anchor.value().attr("href").unwrap_or_default().to_string(),
                lines: text_lines(anchor),
                heading: anchor
                    .select(&CARD_HEADING_SELECTOR)
                    .next()
                    .map(inner_text)
                    .filter(|text| !text.is_empty()),
                image: anchor
                    .select(&IMAGE_SELECTOR)
                    .next()
                    .and_then(|img| img.value().attr("src"))
                    .and_then(|src| absolute_url(base.as_ref(), src)),
            })
            .collect();

        Self {
            url: url.to_string(),
            html: html.to_string(),
            lines,
            anchors,
            selector_found: None,
            navigation_timed_out: false,
        }
    }

    /// Почему снимок может быть неполным: страница не догрузилась
    /// или так и не появился ожидаемый селектор.
    pub fn partial_reason(&self) -> Option<FailureKind> {
        if self.navigation_timed_out {
            Some(FailureKind::NavigationTimeout)
        } else if self.selector_found == Some(false) {
            Some(FailureKind::SelectorNotFound)
        } else {
            None
        }
    }

    pub(crate) fn from_snapshot(url: &str, html: String, snapshot: PageSnapshot) -> Self {
        let anchors = snapshot
            .anchors
            .into_iter()
            .map(|anchor| Anchor {
                href: anchor.href,
                lines: split_lines(&anchor.text),
                heading: anchor
                    .heading
                    .map(|text| text.trim().to_string())
                    .filter(|text| !text.is_empty()),
                image: anchor.image.filter(|src| !src.trim().is_empty()),
            })
            .collect();

        Self {
            url: url.to_string(),
            html,
            lines: split_lines(&snapshot.text),
            anchors,
            selector_found: None,
            navigation_timed_out: false,
        }
    }
}

/// Разбить текст на обрезанные непустые строки.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Видимый текст элемента построчно, как `innerText`: строчные элементы
/// сливаются в одну строку, блочные и `<br>` начинают новую. Содержимое
/// script/style/noscript/template пропускается.
pub fn text_lines(element: ElementRef<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    collect_text(element, &mut current, &mut lines);
    flush_line(&mut current, &mut lines);
    lines
}

fn collect_text(element: ElementRef<'_>, current: &mut String, lines: &mut Vec<String>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            current.push_str(text);
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };
        let name = child.value().name();
        if HIDDEN_ELEMENTS.contains(&name) {
            continue;
        }
        if name == "br" {
            flush_line(current, lines);
            continue;
        }

        let block = BLOCK_ELEMENTS.contains(&name);
        if block {
            flush_line(current, lines);
        }
        collect_text(child, current, lines);
        if block {
            flush_line(current, lines);
        }
    }
}

fn flush_line(current: &mut String, lines: &mut Vec<String>) {
    let line = current.split_whitespace().collect::<Vec<_>>().join(" ");
    if !line.is_empty() {
        lines.push(line);
    }
    current.clear();
}

/// Текст элемента одной строкой со схлопнутыми пробелами.
pub fn inner_text(element: ElementRef<'_>) -> String {
    text_lines(element)
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn absolute_url(base: Option<&Url>, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    match base {
        Some(base) => base.join(href).ok().map(|u| u.to_string()),
        None => Some(href.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_html_collects_anchor_lines_and_media() {
        let html = r#"
            <html><body>
              <script>var hidden = "not text";</script>
              <a href="/events/run-for-education/">
                <img src="/img/run.jpg">
                <div>22</div><div>MAR</div>
                <div>Sun, 22 Mar - 22 Mar, 2026</div>
                <h3> Run for Education </h3>
              </a>
            </body></html>
        "#;
        let doc = RenderedDocument::from_html("https://skillbloomer.com/events/", html);

        assert_eq!(doc.anchors.len(), 1);
        let anchor = &doc.anchors[0];
        assert_eq!(anchor.href, "/events/run-for-education/");
        assert_eq!(
            anchor.lines,
            vec!["22", "MAR", "Sun, 22 Mar - 22 Mar, 2026", "Run for Education"]
        );
        assert_eq!(anchor.heading.as_deref(), Some("Run for Education"));
        assert_eq!(
            anchor.image.as_deref(),
            Some("https://skillbloomer.com/img/run.jpg")
        );
        assert!(!doc.lines.iter().any(|line| line.contains("hidden")));
    }

    #[test]
    fn inline_markup_stays_on_one_line() {
        let html = r#"<html><body>
            <p>Date: <b>Sun</b>, 22 Mar</p>
            <div>Time:<br>6 AM</div>
            <span>a</span><span>b</span>
        </body></html>"#;
        let doc = RenderedDocument::from_html("https://skillbloomer.com/", html);
        assert_eq!(doc.lines, vec!["Date: Sun, 22 Mar", "Time:", "6 AM", "ab"]);
    }

    #[test]
    fn partial_reason_prefers_navigation_timeout() {
        let mut doc = RenderedDocument::default();
        assert_eq!(doc.partial_reason(), None);

        doc.selector_found = Some(false);
        assert_eq!(doc.partial_reason(), Some(FailureKind::SelectorNotFound));

        doc.navigation_timed_out = true;
        assert_eq!(doc.partial_reason(), Some(FailureKind::NavigationTimeout));
    }

    #[test]
    fn split_lines_drops_blank_lines() {
        assert_eq!(split_lines("  a \n\n\t\n b"), vec!["a", "b"]);
    }
}
