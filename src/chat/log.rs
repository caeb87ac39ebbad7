use crate::chat::message::{ChatMessage, Sender};

/// Append-only chat history.
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Messages appended after the first `offset` entries.
    pub fn since(&self, offset: usize) -> &[ChatMessage] {
        self.messages.get(offset..).unwrap_or_default()
    }

    pub fn count_from(&self, sender: Sender) -> usize {
        self.messages.iter().filter(|m| m.sender == sender).count()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
