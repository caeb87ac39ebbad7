pub mod controller;

pub use controller::{ConversationController, SubmitError, SubmitOutcome, RETRY_MESSAGE};
