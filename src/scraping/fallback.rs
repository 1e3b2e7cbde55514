use tracing::warn;

use crate::error::FailureKind;
use crate::models::EventSummary;

/// Фиксированный набор, который отдаём, если со страницы ничего не извлеклось.
pub fn sample_events() -> Vec<EventSummary> {
    vec![
        EventSummary {
            slug: "sample-event-1".to_string(),
            title: "Annual Fundraiser 2026".to_string(),
            image: "https://images.unsplash.com/photo-1469571486292-0ba58a3f068b?w=800&auto=format&fit=crop&q=60".to_string(),
            date_short: "15 Mar".to_string(),
            long_date: "Sun, 15 Mar 2026".to_string(),
            day: "Sun".to_string(),
            location: "New York City".to_string(),
            category: "Community".to_string(),
            interested: "120+".to_string(),
            time: "09:00 AM".to_string(),
            tickets_available: true,
            booking_url: "https://skillbloomer.com/events/sample-event-1".to_string(),
        },
        EventSummary {
            slug: "sample-event-2".to_string(),
            title: "Beach Cleanup Drive".to_string(),
            image: "https://images.unsplash.com/photo-1618477461853-cf6ed80fbfc9?w=800&auto=format&fit=crop&q=60".to_string(),
            date_short: "22 Apr".to_string(),
            long_date: "Wed, 22 Apr 2026".to_string(),
            day: "Wed".to_string(),
            location: "Miami Beach".to_string(),
            category: "Environment".to_string(),
            interested: "85+".to_string(),
            time: "08:00 AM - 1:00 PM".to_string(),
            tickets_available: false,
            booking_url: "https://skillbloomer.com/events/sample-event-2".to_string(),
        },
    ]
}

/// Пустой результат заменяется образцом; непустой возвращается как есть.
pub fn apply_fallback(events: Vec<EventSummary>) -> Vec<EventSummary> {
    if !events.is_empty() {
        return events;
    }
    warn!(
        kind = ?FailureKind::TotalExtractionEmpty,
        "No events extracted, serving sample dataset"
    );
    sample_events()
}
