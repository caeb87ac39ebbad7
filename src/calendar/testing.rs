use crate::calendar::event::CalendarEvent;
use crate::calendar::projector::{CalendarWidget, RenderError};

/// In-memory widget that records every call made to it.
#[derive(Debug, Default)]
pub struct RecordingCalendar {
    pub events: Vec<CalendarEvent>,
    pub renders: usize,
    pub clears: usize,
    pub reject_ids: Vec<String>,
}

impl RecordingCalendar {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CalendarWidget for RecordingCalendar {
    fn remove_all_events(&mut self) {
        self.events.clear();
        self.clears += 1;
    }

    fn add_event(&mut self, event: CalendarEvent) -> Result<(), RenderError> {
        if self.reject_ids.contains(&event.id) {
            return Err(RenderError::Rejected {
                id: event.id,
                reason: "rejected by test".to_string(),
            });
        }
        self.events.push(event);
        Ok(())
    }

    fn render(&mut self) {
        self.renders += 1;
    }
}
