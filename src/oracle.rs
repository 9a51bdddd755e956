//! Oracle abstraction
//!
//! The chat oracle produces free-form replies, the intent oracle classifies
//! a message into an intent plus slots. Both are remote services reached
//! through the relay.

mod error;
mod relay;
mod types;

pub use error::{OracleError, OracleErrorKind};
pub use relay::RelayClient;
pub use types::Classification;

use crate::catalog::PageContext;
use crate::history::Message;
use async_trait::async_trait;
use std::sync::Arc;

/// Free-form conversational replies
#[async_trait]
pub trait ChatOracle: Send + Sync {
    /// Reply to `message` given the prior exchanges
    async fn reply(&self, history: &[Message], message: &str) -> Result<String, OracleError>;
}

/// Intent classification
#[async_trait]
pub trait IntentOracle: Send + Sync {
    async fn classify(
        &self,
        message: &str,
        page: &PageContext,
    ) -> Result<Classification, OracleError>;
}

#[async_trait]
impl<T: ChatOracle + ?Sized> ChatOracle for Arc<T> {
    async fn reply(&self, history: &[Message], message: &str) -> Result<String, OracleError> {
        self.as_ref().reply(history, message).await
    }
}

#[async_trait]
impl<T: IntentOracle + ?Sized> IntentOracle for Arc<T> {
    async fn classify(
        &self,
        message: &str,
        page: &PageContext,
    ) -> Result<Classification, OracleError> {
        self.as_ref().classify(message, page).await
    }
}

/// Logging wrapper for oracles
pub struct LoggingOracle<T> {
    inner: T,
    name: &'static str,
}

impl<T> LoggingOracle<T> {
    pub fn new(inner: T, name: &'static str) -> Self {
        Self { inner, name }
    }
}

#[async_trait]
impl<T: ChatOracle> ChatOracle for LoggingOracle<T> {
    async fn reply(&self, history: &[Message], message: &str) -> Result<String, OracleError> {
        let start = std::time::Instant::now();
        let result = self.inner.reply(history, message).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    oracle = self.name,
                    duration_ms = %duration.as_millis(),
                    history_len = history.len(),
                    reply_len = reply.len(),
                    "Chat request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    oracle = self.name,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = e.kind.label(),
                    "Chat request failed"
                );
            }
        }

        result
    }
}

#[async_trait]
impl<T: IntentOracle> IntentOracle for LoggingOracle<T> {
    async fn classify(
        &self,
        message: &str,
        page: &PageContext,
    ) -> Result<Classification, OracleError> {
        let start = std::time::Instant::now();
        let result = self.inner.classify(message, page).await;
        let duration = start.elapsed();

        match &result {
            Ok(classification) => {
                tracing::info!(
                    oracle = self.name,
                    duration_ms = %duration.as_millis(),
                    page = %page,
                    intent = %classification.intent,
                    slots = classification.slots.len(),
                    "Intent request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    oracle = self.name,
                    duration_ms = %duration.as_millis(),
                    page = %page,
                    error = %e.message,
                    kind = e.kind.label(),
                    "Intent request failed"
                );
            }
        }

        result
    }
}
