//! Ephemeral cross-page handoff slot
//!
//! Carries the captured template text from the dialogue to the page the user
//! is redirected to. Failures here never interrupt the dialogue.

use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

/// Key under which the last filled-in template is stored
pub const TEMPLATE_KEY: &str = "sani_last_template";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandoffError {
    #[error("handoff storage is disabled")]
    Disabled,
    #[error("handoff value of {size} bytes exceeds quota of {quota} bytes")]
    QuotaExceeded { size: usize, quota: usize },
}

/// Session-scoped key/value storage for handoff values
pub trait HandoffStore: Send + Sync {
    fn put(&self, session_id: &str, key: &str, value: &str) -> Result<(), HandoffError>;

    fn get(&self, session_id: &str, key: &str) -> Option<String>;

    /// Drop every value belonging to a session
    fn clear_session(&self, session_id: &str);
}

/// In-memory handoff store with a per-value byte quota
#[derive(Debug)]
pub struct MemoryHandoffStore {
    max_bytes: usize,
    values: RwLock<HashMap<(String, String), String>>,
}

impl MemoryHandoffStore {
    /// A quota of 0 disables the store
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            values: RwLock::new(HashMap::new()),
        }
    }
}

impl HandoffStore for MemoryHandoffStore {
    fn put(&self, session_id: &str, key: &str, value: &str) -> Result<(), HandoffError> {
        if self.max_bytes == 0 {
            return Err(HandoffError::Disabled);
        }
        if value.len() > self.max_bytes {
            return Err(HandoffError::QuotaExceeded {
                size: value.len(),
                quota: self.max_bytes,
            });
        }
        let mut values = self
            .values
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        values.insert((session_id.to_string(), key.to_string()), value.to_string());
        Ok(())
    }

    fn get(&self, session_id: &str, key: &str) -> Option<String> {
        let values = self
            .values
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        values
            .get(&(session_id.to_string(), key.to_string()))
            .cloned()
    }

    fn clear_session(&self, session_id: &str) {
        let mut values = self
            .values
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        values.retain(|(sid, _), _| sid != session_id);
    }
}
