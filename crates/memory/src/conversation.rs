//! Conversation memory: the append-only message log of one chat session.
//!
//! The full log is retained for export; prompt construction reads a
//! bounded window through [`ConversationMemory::recent`].

use serde::{Deserialize, Serialize};
use stellar_core::message::Message;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationMemory {
    messages: Vec<Message>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Record a completed turn: the user query followed by the answer.
    pub fn append_exchange(&mut self, query: impl Into<String>, answer: impl Into<String>) {
        self.messages.push(Message::user(query));
        self.messages.push(Message::assistant(answer));
    }

    /// The last `n` messages, oldest first. Shorter when the log holds fewer.
    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Serialize the full log as a JSON array.
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.messages)
    }
}
