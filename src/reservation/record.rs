use serde::{Deserialize, Serialize};

/// A finalized reservation as returned by `GET /get_reservations`.
///
/// `title` and `start` are always sent by a healthy backend, but they are
/// optional here so a single broken entry cannot fail the whole list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub title: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    #[serde(rename = "allDay")]
    pub all_day: Option<bool>,
    pub description: Option<String>,
}

impl ReservationRecord {
    pub fn is_all_day(&self) -> bool {
        self.all_day.unwrap_or(false)
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    pub fn start(&self) -> Option<&str> {
        self.start.as_deref().filter(|s| !s.is_empty())
    }
}
