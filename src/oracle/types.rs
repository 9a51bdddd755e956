//! Wire types for the oracle relay endpoints

use crate::catalog::{Intent, Slots};
use crate::history::Message;
use serde::{Deserialize, Serialize};

/// `POST /api/chat` request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub history: &'a [Message],
    pub message: &'a str,
}

/// `POST /api/chat` response body
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub reply: Option<String>,
}

/// `POST /api/parse-intent` request body
#[derive(Debug, Clone, Serialize)]
pub struct ParseIntentRequest<'a> {
    pub message: &'a str,
    pub page: &'a str,
}

/// `POST /api/parse-intent` response body
#[derive(Debug, Clone, Deserialize)]
pub struct ParseIntentResponse {
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub slots: Option<Slots>,
}

/// Decoded NLU result
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub intent: Intent,
    pub slots: Slots,
}

impl From<ParseIntentResponse> for Classification {
    fn from(response: ParseIntentResponse) -> Self {
        Self::new(
            Intent::parse(response.intent.as_deref()),
            response.slots.unwrap_or_default(),
        )
    }
}

impl Classification {
    pub fn new(intent: Intent, slots: Slots) -> Self {
        Self { intent, slots }
    }
}
