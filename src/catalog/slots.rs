//! Named slots extracted alongside an intent

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Slot mapping from the NLU oracle (`key -> string | null`)
///
/// Numbers and booleans are kept as their text; nested values are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Slots(BTreeMap<String, Option<String>>);

impl<'de> Deserialize<'de> for Slots {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => Some((key, None)),
                Value::String(s) => Some((key, Some(s))),
                Value::Number(n) => Some((key, Some(n.to_string()))),
                Value::Bool(b) => Some((key, Some(b.to_string()))),
                Value::Array(_) | Value::Object(_) => {
                    tracing::debug!(slot = %key, "Ignoring non-scalar slot value");
                    None
                }
            })
            .collect())
    }
}

impl Slots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), Some(value.into()));
        self
    }

    /// Get a slot value. Null and empty values count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Option::as_deref)
            .filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Option<String>)> for Slots {
    fn from_iter<I: IntoIterator<Item = (String, Option<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
