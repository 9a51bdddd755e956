//! Per-session conversation history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation as sent to the chat oracle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A message as stored, with the time it was recorded
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    #[serde(flatten)]
    pub message: Message,
    pub created_at: DateTime<Utc>,
}

/// Append-only message log for one session.
///
/// Only complete user/assistant exchanges are recorded, so the log always
/// holds an even number of messages.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<Entry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a user message and the reply it received
    pub fn record_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        let now = Utc::now();
        self.entries.push(Entry {
            message: Message::user(user),
            created_at: now,
        });
        self.entries.push(Entry {
            message: Message::assistant(assistant),
            created_at: now,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The most recent messages to send as oracle context.
    ///
    /// `limit` is rounded down to an even number (minimum 2) so an exchange
    /// is never split.
    pub fn window(&self, limit: usize) -> Vec<Message> {
        if self.is_empty() {
            return Vec::new();
        }
        let limit = (limit - limit % 2).max(2);
        let start = self.entries.len().saturating_sub(limit);
        self.entries[start..]
            .iter()
            .map(|e| e.message.clone())
            .collect()
    }
}
