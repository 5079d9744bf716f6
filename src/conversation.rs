//! In-memory chat transcript.
//!
//! Entries are replaced by id, never by position, so applying the same update
//! twice or out of order converges to the same transcript.

use crate::models::ConversationMessage;

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ConversationMessage>,
}

impl Transcript {
    pub fn new(messages: Vec<ConversationMessage>) -> Self {
        Self { messages }
    }

    /// Replace the entry with the same id, or append
    pub fn upsert(&mut self, message: ConversationMessage) {
        match self.messages.iter_mut().find(|m| m.id == message.id) {
            Some(existing) => *existing = message,
            None => self.messages.push(message),
        }
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    /// Settled messages only, for use as model context
    pub fn history(&self) -> Vec<ConversationMessage> {
        self.messages.iter().filter(|m| !m.pending).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
