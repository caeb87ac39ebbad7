pub mod details;
pub mod event;
pub mod palette;
pub mod projector;
#[cfg(test)]
pub(crate) mod testing;

pub use details::format_event_details;
pub use event::CalendarEvent;
pub use palette::{ColorRule, Palette};
pub use projector::{project_records, CalendarProjector, CalendarWidget, RefreshReport, RenderError};
