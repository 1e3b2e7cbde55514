use serde::{Deserialize, Serialize};

/// Карточка события из списка. Ни одно поле не бывает пустым.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub slug: String,
    pub title: String,
    pub image: String,
    pub date_short: String,
    pub long_date: String,
    pub day: String,
    pub location: String,
    pub category: String,
    pub interested: String,
    pub time: String,
    pub tickets_available: bool,
    pub booking_url: String,
}

/// Полная информация со страницы события.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    pub title: String,
    pub image: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub description: String,
    pub tickets_available: String,
    pub ticket_price: String,
    pub organizer: Organizer,
    pub tags: Vec<String>,
    pub booking_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organizer {
    pub name: String,
    pub image: String,
    pub bio: String,
}

impl EventSummary {
    /// Все строковые поля непустые.
    pub fn is_complete(&self) -> bool {
        [
            &self.slug,
            &self.title,
            &self.image,
            &self.date_short,
            &self.long_date,
            &self.day,
            &self.location,
            &self.category,
            &self.interested,
            &self.time,
            &self.booking_url,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}

impl EventDetail {
    pub fn is_complete(&self) -> bool {
        let fields = [
            &self.title,
            &self.image,
            &self.date,
            &self.time,
            &self.location,
            &self.description,
            &self.tickets_available,
            &self.ticket_price,
            &self.organizer.name,
            &self.organizer.image,
            &self.organizer.bio,
            &self.booking_url,
        ];
        fields.iter().all(|field| !field.trim().is_empty())
            && !self.tags.is_empty()
            && self.tags.iter().all(|tag| !tag.trim().is_empty())
    }
}
