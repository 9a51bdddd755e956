//! Oracle error types

use thiserror::Error;

/// Oracle error with classification
#[derive(Debug, Error, Clone)]
#[error("{message}")]
pub struct OracleError {
    pub kind: OracleErrorKind,
    pub message: String,
}

impl OracleError {
    pub fn new(kind: OracleErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(OracleErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(OracleErrorKind::Timeout, message)
    }

    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::new(OracleErrorKind::Status(code), message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(OracleErrorKind::Malformed, message)
    }

    pub fn empty_reply(message: impl Into<String>) -> Self {
        Self::new(OracleErrorKind::EmptyReply, message)
    }

    /// Classify a transport error from the HTTP client
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(format!("Oracle request timed out: {error}"))
        } else if error.is_decode() {
            Self::malformed(format!("Malformed oracle response: {error}"))
        } else if let Some(status) = error.status() {
            Self::status(status.as_u16(), format!("Oracle returned {status}"))
        } else {
            Self::network(format!("Oracle unreachable: {error}"))
        }
    }
}

/// Error classification, all of them transport failures of one turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleErrorKind {
    /// Connection refused, reset, DNS failure
    Network,
    /// Request exceeded the configured timeout
    Timeout,
    /// Non-success HTTP status
    Status(u16),
    /// Body could not be decoded or lacked required fields
    Malformed,
    /// Success status but the reply text was missing or blank
    EmptyReply,
}

impl OracleErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Status(_) => "status",
            Self::Malformed => "malformed",
            Self::EmptyReply => "empty_reply",
        }
    }
}
