use crate::cache::CacheService;
use crate::models::{EventDetail, EventSummary};

pub const EVENTS_LIST_KEY: &str = "events_list";

pub fn event_detail_key(slug: &str) -> String {
    format!("event_detail_{}", slug)
}

impl CacheService {
    pub async fn get_events_list(&self) -> Option<Vec<EventSummary>> {
        self.get_json(EVENTS_LIST_KEY).await
    }

    pub async fn save_events_list(&self, events: &[EventSummary]) {
        self.set_json(EVENTS_LIST_KEY, events).await
    }

    pub async fn get_event_detail(&self, slug: &str) -> Option<EventDetail> {
        self.get_json(&event_detail_key(slug)).await
    }

    pub async fn save_event_detail(&self, slug: &str, detail: &EventDetail) {
        self.set_json(&event_detail_key(slug), detail).await
    }
}
