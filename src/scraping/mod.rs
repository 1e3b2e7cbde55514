//! Извлечение событий из отрендеренных страниц.
//!
//! Разбор списка и страницы события сделан чистыми функциями над
//! `RenderedDocument`; сетевые части (`extract_*`) лишь рендерят страницу
//! и передают её в разбор.

pub mod detail;
pub mod enrich;
pub mod fallback;
pub mod list;

pub use detail::{extract_detail, parse_detail, DetailOutcome};
pub use enrich::{enrich_summaries, merge_detail, DetailProvider, SessionDetails};
pub use fallback::{apply_fallback, sample_events};
pub use list::{extract_listing, parse_card, parse_listing, slug_from_href, CardFields};

/// Картинка-заглушка, когда на странице нет изображения.
pub const PLACEHOLDER_IMAGE: &str =
    "https://images.unsplash.com/photo-1542838132-92c53300491e?w=800&auto=format&fit=crop&q=60";

/// Первые `limit` символов строки (по символам, не байтам).
pub(crate) fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
