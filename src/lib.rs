pub mod calendar;
pub mod chat;
pub mod conversation;
pub mod reservation;
pub mod storage;
pub mod sync;

pub use calendar::{CalendarEvent, CalendarProjector, CalendarWidget, RenderError};
pub use chat::{ChatLog, ChatMessage, Sender};
pub use conversation::{ConversationController, SubmitError, SubmitOutcome};
pub use reservation::{ReservationDraft, ReservationRecord};
