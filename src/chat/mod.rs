pub mod log;
pub mod message;

pub use log::ChatLog;
pub use message::{ChatMessage, Sender};
