mod common;

use common::{fixture, LISTING_URL};
use event_scraper::config::SiteConfig;
use event_scraper::renderer::{Anchor, RenderedDocument};
use event_scraper::scraping::list::is_url_safe;
use event_scraper::scraping::{parse_listing, slug_from_href, PLACEHOLDER_IMAGE};
use proptest::prelude::*;

fn listing() -> RenderedDocument {
    RenderedDocument::from_html(LISTING_URL, &fixture("listing.html"))
}

#[test]
fn listing_fixture_yields_cards_in_page_order() {
    let events = parse_listing(&listing().anchors, &SiteConfig::default());

    let slugs: Vec<_> = events.iter().map(|e| e.slug.as_str()).collect();
    assert_eq!(slugs, vec!["run-for-education", "online-webinar", "tree-plantation"]);
}

#[test]
fn positional_card_is_fully_parsed() {
    let events = parse_listing(&listing().anchors, &SiteConfig::default());
    let run = &events[0];

    assert_eq!(run.title, "Run for Education");
    assert_eq!(run.date_short, "22 MAR");
    assert_eq!(run.long_date, "Sun, 22 Mar - 22 Mar, 2026");
    assert_eq!(run.day, "Sun");
    assert_eq!(run.location, "Hyderabad");
    assert_eq!(run.image, "https://skillbloomer.com/wp-content/uploads/run.jpg");
    assert_eq!(run.category, "Event");
    assert_eq!(run.interested, "50+");
    assert_eq!(run.time, "10:00 AM - 5:00 PM");
    assert!(run.tickets_available);
    assert_eq!(run.booking_url, "https://skillbloomer.com/events/run-for-education");
}

#[test]
fn short_card_falls_back_to_online_and_placeholder() {
    let events = parse_listing(&listing().anchors, &SiteConfig::default());
    let webinar = &events[1];

    assert_eq!(webinar.title, "Online Webinar");
    assert_eq!(webinar.location, "Online");
    assert_eq!(webinar.date_short, "Sat, 4");
    assert_eq!(webinar.image, PLACEHOLDER_IMAGE);
}

#[test]
fn later_anchor_with_same_slug_overwrites_in_place() {
    let anchors = vec![
        Anchor {
            href: "/events/a/".into(),
            lines: vec!["First A".into()],
            ..Anchor::default()
        },
        Anchor {
            href: "/events/b/".into(),
            lines: vec!["B".into()],
            ..Anchor::default()
        },
        Anchor {
            href: "https://skillbloomer.com/events/a".into(),
            lines: vec!["Second A".into()],
            ..Anchor::default()
        },
    ];

    let events = parse_listing(&anchors, &SiteConfig::default());
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].slug, "a");
    assert_eq!(events[0].title, "Second A");
    assert_eq!(events[1].slug, "b");
}

#[test]
fn title_falls_back_to_slug_words() {
    let anchors = vec![Anchor {
        href: "/events/beach-cleanup-drive/".into(),
        ..Anchor::default()
    }];
    let events = parse_listing(&anchors, &SiteConfig::default());
    assert_eq!(events[0].title, "beach cleanup drive");
    assert!(events[0].is_complete());
}

#[test]
fn parsing_is_idempotent() {
    let doc = listing();
    let site = SiteConfig::default();
    assert_eq!(parse_listing(&doc.anchors, &site), parse_listing(&doc.anchors, &site));
}

#[test]
fn dot_segments_are_not_slugs() {
    let site = SiteConfig::default();
    assert_eq!(slug_from_href("/events/../", &site), None);
    assert_eq!(slug_from_href("https://skillbloomer.com/events/./", &site), None);
    assert!(!is_url_safe(".."));
    assert!(is_url_safe("v1.2"));
}

#[test]
fn empty_page_yields_nothing() {
    let doc = RenderedDocument::from_html(LISTING_URL, &fixture("empty_listing.html"));
    assert!(parse_listing(&doc.anchors, &SiteConfig::default()).is_empty());
}

proptest! {
    #[test]
    fn slugs_are_non_empty_and_url_safe(
        path in "((\\.{1,2}|[a-zA-Z0-9 ?#._-]{1,8})/?){0,5}",
    ) {
        let href = format!("/events/{path}");
        if let Some(slug) = slug_from_href(&href, &SiteConfig::default()) {
            prop_assert!(!slug.is_empty());
            prop_assert!(is_url_safe(&slug));
            prop_assert_ne!(slug.as_str(), "events");
            prop_assert!(!slug.chars().all(|c| c == '.'));
        }
    }

    #[test]
    fn every_summary_field_is_filled(
        slug in "[a-z0-9]{1,8}(-[a-z0-9]{1,8}){0,3}",
        lines in proptest::collection::vec("[ -~]{0,20}", 0..8),
        heading in proptest::option::of("[ -~]{0,20}"),
    ) {
        let anchor = Anchor {
            href: format!("/events/{slug}/"),
            lines: lines
                .iter()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
            heading: heading.map(|h| h.trim().to_string()).filter(|h| !h.is_empty()),
            image: None,
        };
        let events = parse_listing(&[anchor], &SiteConfig::default());
        prop_assert_eq!(events.len(), 1);
        prop_assert!(events[0].is_complete());
        prop_assert_eq!(&events[0].slug, &slug);
    }
}
