use reschat::{
    calendar::{CalendarEvent, CalendarWidget, RenderError},
    storage::config::TimeFormat,
};

/// Calendar widget that renders reservations as a numbered terminal agenda.
pub struct AgendaCalendar {
    events: Vec<CalendarEvent>,
    time_format: TimeFormat,
    pending_output: Option<String>,
}

impl AgendaCalendar {
    pub fn new(time_format: TimeFormat) -> Self {
        Self {
            events: Vec::new(),
            time_format,
            pending_output: None,
        }
    }

    /// Event by its 1-based number in the last rendered agenda.
    pub fn event(&self, number: usize) -> Option<&CalendarEvent> {
        number.checked_sub(1).and_then(|index| self.events.get(index))
    }

    /// Hover text for the event numbered `number`.
    pub fn tooltip(&self, number: usize) -> Option<String> {
        self.event(number).map(|event| event.tooltip(self.time_format))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Agenda text produced by the last `render`, if not yet taken.
    pub fn take_output(&mut self) -> Option<String> {
        self.pending_output.take()
    }
}

impl CalendarWidget for AgendaCalendar {
    fn remove_all_events(&mut self) {
        self.events.clear();
    }

    fn add_event(&mut self, event: CalendarEvent) -> Result<(), RenderError> {
        if let Some(end) = event.end
            && end < event.start
        {
            return Err(RenderError::Rejected {
                id: event.id,
                reason: "ends before it starts".to_string(),
            });
        }
        self.events.push(event);
        Ok(())
    }

    fn render(&mut self) {
        self.events.sort_by_key(|event| event.start);
        self.pending_output = Some(format_agenda_text(&self.events, self.time_format));
    }
}

pub fn format_agenda_text(events: &[CalendarEvent], time_format: TimeFormat) -> String {
    let mut lines = vec!["Reservations".to_string()];

    if events.is_empty() {
        lines.push("  No reservations yet.".to_string());
    }

    for (index, event) in events.iter().enumerate() {
        let marker = if event.is_new { "  (new)" } else { "" };
        lines.push(format!(
            "  [{}] {}  {:<19} {} {}{}",
            index + 1,
            event.start.format("%a %Y-%m-%d"),
            event.time_range(time_format),
            event.color,
            event.title,
            marker
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn event(title: &str, start: NaiveDateTime, end: Option<NaiveDateTime>) -> CalendarEvent {
        CalendarEvent {
            id: format!("{}{}", title, start),
            title: title.to_string(),
            start,
            end,
            all_day: false,
            color: "#6366f1".to_string(),
            is_new: false,
            description: None,
        }
    }

    #[test]
    fn render_sorts_events_by_start() {
        let mut agenda = AgendaCalendar::new(TimeFormat::TwentyFourHour);
        agenda.add_event(event("Later", at(3, 9), None)).unwrap();
        agenda.add_event(event("Sooner", at(2, 9), None)).unwrap();

        agenda.render();

        assert_eq!(agenda.event(1).unwrap().title, "Sooner");
        assert_eq!(agenda.event(2).unwrap().title, "Later");
    }

    #[test]
    fn event_numbers_are_one_based() {
        let mut agenda = AgendaCalendar::new(TimeFormat::TwentyFourHour);
        agenda.add_event(event("Only", at(2, 9), None)).unwrap();

        assert!(agenda.event(0).is_none());
        assert!(agenda.event(2).is_none());
        assert_eq!(agenda.event(1).unwrap().title, "Only");
    }

    #[test]
    fn tooltip_uses_agenda_time_format() {
        let mut agenda = AgendaCalendar::new(TimeFormat::TwentyFourHour);
        agenda.add_event(event("John", at(2, 15), Some(at(2, 16)))).unwrap();

        assert_eq!(agenda.tooltip(1).as_deref(), Some("John\n15:00 - 16:00"));
        assert_eq!(agenda.tooltip(2), None);
    }

    #[test]
    fn rejects_event_ending_before_start() {
        let mut agenda = AgendaCalendar::new(TimeFormat::TwentyFourHour);

        let result = agenda.add_event(event("Backwards", at(2, 10), Some(at(2, 9))));

        assert!(matches!(result, Err(RenderError::Rejected { .. })));
        assert_eq!(agenda.len(), 0);
    }

    #[test]
    fn render_produces_output_once() {
        let mut agenda = AgendaCalendar::new(TimeFormat::TwentyFourHour);
        let mut highlighted = event("John", at(2, 15), Some(at(2, 16)));
        highlighted.is_new = true;
        agenda.add_event(highlighted).unwrap();

        agenda.render();
        let output = agenda.take_output().unwrap();

        assert!(output.contains("[1] Tue 2024-01-02  15:00 - 16:00"));
        assert!(output.ends_with("John  (new)"));
        assert!(agenda.take_output().is_none());
    }

    #[test]
    fn empty_agenda_says_so() {
        assert_eq!(
            format_agenda_text(&[], TimeFormat::TwelveHour),
            "Reservations\n  No reservations yet."
        );
    }
}
