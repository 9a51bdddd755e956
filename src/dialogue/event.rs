//! Events that can occur in a dialogue session

use crate::catalog::{Intent, Slots};
use crate::oracle::OracleErrorKind;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserMessage {
        text: String,
    },

    // Chat oracle events
    ChatReply {
        reply: String,
    },
    ChatFailed {
        kind: OracleErrorKind,
        message: String,
    },

    // NLU oracle events
    IntentParsed {
        intent: Intent,
        slots: Slots,
    },
    IntentFailed {
        message: String,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::UserMessage { .. } => "user_message",
            Event::ChatReply { .. } => "chat_reply",
            Event::ChatFailed { .. } => "chat_failed",
            Event::IntentParsed { .. } => "intent_parsed",
            Event::IntentFailed { .. } => "intent_failed",
        }
    }
}
