pub mod event;

pub use event::{EventDetail, EventSummary, Organizer};
