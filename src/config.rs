//! Environment-driven configuration

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";
pub const DEFAULT_HISTORY_WINDOW: usize = 20;
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_HANDOFF_MAX_BYTES: usize = 16 * 1024;
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(30 * 60);

/// Service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaniConfig {
    pub port: u16,
    /// Base URL of the chat/NLU relay
    pub api_base: String,
    /// Messages of history sent to the chat oracle, always even
    pub history_window: usize,
    pub oracle_timeout: Duration,
    /// Handoff slot quota, 0 disables the slot
    pub handoff_max_bytes: usize,
    /// Sessions without activity for this long are closed; `None` keeps them forever
    pub session_idle_timeout: Option<Duration>,
}

impl Default for SaniConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_base: DEFAULT_API_BASE.to_string(),
            history_window: DEFAULT_HISTORY_WINDOW,
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT,
            handoff_max_bytes: DEFAULT_HANDOFF_MAX_BYTES,
            session_idle_timeout: Some(DEFAULT_SESSION_IDLE),
        }
    }
}

impl SaniConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unparsable values fall back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        Self {
            port: parsed("SANI_PORT")
                .and_then(|p| u16::try_from(p).ok())
                .unwrap_or(defaults.port),
            api_base: lookup("SANI_API_BASE")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.api_base),
            history_window: parsed("SANI_HISTORY_WINDOW")
                .and_then(|w| usize::try_from(w).ok())
                .map_or(defaults.history_window, normalize_window),
            oracle_timeout: parsed("SANI_ORACLE_TIMEOUT_SECS")
                .filter(|secs| *secs > 0)
                .map_or(defaults.oracle_timeout, Duration::from_secs),
            handoff_max_bytes: parsed("SANI_HANDOFF_MAX_BYTES")
                .and_then(|b| usize::try_from(b).ok())
                .unwrap_or(defaults.handoff_max_bytes),
            session_idle_timeout: parsed("SANI_SESSION_IDLE_SECS").map_or(
                defaults.session_idle_timeout,
                |secs| (secs > 0).then_some(Duration::from_secs(secs)),
            ),
        }
    }
}

/// Round down to an even count, never below one exchange
fn normalize_window(window: usize) -> usize {
    (window - window % 2).max(2)
}
