use crate::calendar::event::CalendarEvent;
use crate::storage::config::TimeFormat;

/// Chat text shown when an event is clicked on the calendar.
pub fn format_event_details(event: &CalendarEvent, time_format: TimeFormat) -> String {
    let mut lines = vec![
        event.title.clone(),
        format!("📅 {}", event.start.format("%A, %B %-d, %Y")),
        format!("⏰ {}", event.time_range(time_format)),
    ];

    if let Some(description) = &event.description
        && !description.trim().is_empty()
    {
        lines.push(format!("📝 {}", description));
    }

    lines.join("\n")
}
