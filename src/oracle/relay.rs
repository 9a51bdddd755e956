//! HTTP client for the chat/NLU relay service

use super::types::{
    ChatRequest, ChatResponse, Classification, ParseIntentRequest, ParseIntentResponse,
};
use super::{ChatOracle, IntentOracle, OracleError};
use crate::catalog::PageContext;
use crate::history::Message;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Talks to `POST /api/chat` and `POST /api/parse-intent` on the relay
pub struct RelayClient {
    client: Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OracleError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, OracleError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| OracleError::from_reqwest(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| OracleError::from_reqwest(&e))?;

        if !status.is_success() {
            return Err(OracleError::status(
                status.as_u16(),
                format!("{path} returned {status}: {text}"),
            ));
        }

        serde_json::from_str(&text)
            .map_err(|e| OracleError::malformed(format!("Failed to parse {path} response: {e}")))
    }
}

#[async_trait]
impl ChatOracle for RelayClient {
    async fn reply(&self, history: &[Message], message: &str) -> Result<String, OracleError> {
        let response: ChatResponse = self
            .post("/api/chat", &ChatRequest { history, message })
            .await?;

        match response.reply {
            Some(reply) if !reply.trim().is_empty() => Ok(reply),
            _ => Err(OracleError::empty_reply("/api/chat response has no reply")),
        }
    }
}

#[async_trait]
impl IntentOracle for RelayClient {
    async fn classify(
        &self,
        message: &str,
        page: &PageContext,
    ) -> Result<Classification, OracleError> {
        let response: ParseIntentResponse = self
            .post(
                "/api/parse-intent",
                &ParseIntentRequest {
                    message,
                    page: page.as_str(),
                },
            )
            .await?;

        Ok(Classification::from(response))
    }
}
