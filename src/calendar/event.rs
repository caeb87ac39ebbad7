use chrono::NaiveDateTime;

use crate::storage::config::TimeFormat;

/// Render-ready projection of one reservation record.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub all_day: bool,
    pub color: String,
    pub is_new: bool,
    pub description: Option<String>,
}

impl CalendarEvent {
    /// `start - end`, just `start` when open-ended, or "All day".
    pub fn time_range(&self, time_format: TimeFormat) -> String {
        if self.all_day {
            return "All day".to_string();
        }

        let start = self.start.format(time_format.pattern());
        match self.end {
            Some(end) => format!("{} - {}", start, end.format(time_format.pattern())),
            None => start.to_string(),
        }
    }

    pub fn tooltip(&self, time_format: TimeFormat) -> String {
        format!("{}\n{}", self.title, self.time_range(time_format))
    }

    /// The `(title, start, end, color)` tuple that determines what the
    /// calendar shows, ignoring identity and highlight state.
    pub fn visual_key(&self) -> (&str, NaiveDateTime, Option<NaiveDateTime>, &str) {
        (&self.title, self.start, self.end, &self.color)
    }
}
