pub mod agenda;
pub mod session;

pub use session::run_chat;
