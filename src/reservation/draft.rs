use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::reservation::timestamp::parse_timestamp;
use crate::storage::config::TimeFormat;

/// The in-progress reservation negotiated through chat.
///
/// The backend owns the shape of this object; the client only reads
/// `title`, `start` and `end` for display and passes everything else through
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationDraft {
    fields: Map<String, Value>,
}

impl ReservationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn title(&self) -> Option<&str> {
        self.text_field("title")
    }

    pub fn start(&self) -> Option<&str> {
        self.text_field("start")
    }

    pub fn end(&self) -> Option<&str> {
        self.text_field("end")
    }

    // null and "" both mean "not collected yet"
    fn text_field(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Human-readable status of what has been collected so far, or `None`
    /// when nothing displayable is present.
    pub fn summary(&self, time_format: TimeFormat) -> Option<String> {
        if self.title().is_none() && self.start().is_none() && self.end().is_none() {
            return None;
        }

        let mut lines = vec!["Current reservation details:".to_string()];

        if let Some(title) = self.title() {
            lines.push(format!("• Name: {}", title));
        }

        if let Some(start) = self.start() {
            let date = parse_timestamp(start)
                .map(|dt| dt.format("%d.%m.%Y").to_string())
                .unwrap_or_else(|| start.to_string());
            lines.push(format!("• Date: {}", date));
        }

        if let Some(end) = self.end() {
            let time = parse_timestamp(end)
                .map(|dt| dt.format(time_format.pattern()).to_string())
                .unwrap_or_else(|| end.to_string());
            lines.push(format!("• Time: {}", time));
        }

        Some(lines.join("\n"))
    }
}
