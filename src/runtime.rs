//! Runtime for executing dialogue sessions
//!
//! Each session is an actor task that owns its dialogue state and history.
//! The `SessionManager` keeps the handles used to reach them and forgets a
//! session once its actor stops, whether closed or expired.

mod executor;


pub use executor::SessionRuntime;

use crate::catalog::{Destination, PageContext};
use crate::dialogue::{
    DialoguePhase, DialogueState, PendingAction, SessionContext, TransitionError,
};
use crate::handoff::{HandoffStore, TEMPLATE_KEY};
use crate::history::{Entry, History};
use crate::oracle::{ChatOracle, IntentOracle};
use executor::Envelope;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch, RwLock};
use tokio_util::sync::CancellationToken;

/// Type alias for the runtime the manager spawns
pub type SharedRuntime = SessionRuntime<Arc<dyn ChatOracle>, Arc<dyn IntentOracle>>;

type SessionMap = Arc<RwLock<HashMap<String, SessionHandle>>>;

/// Per-session limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Messages of history sent with each chat request
    pub history_window: usize,
    /// Close the session after this long without activity; `None` never expires
    pub idle_timeout: Option<Duration>,
}

/// Errors surfaced to callers of a session
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Session is closed")]
    Closed,
    #[error(transparent)]
    Rejected(#[from] TransitionError),
}

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum SseEvent {
    Init {
        snapshot: serde_json::Value,
    },
    Message {
        message: serde_json::Value,
    },
    StateChange {
        /// e.g. `{"type":"awaiting_confirmation","phase":"AWAITING_CONFIRMATION","busy":false,...}`
        state: serde_json::Value,
    },
    Navigate {
        /// `{"page": ..., "url": ...}`
        destination: serde_json::Value,
    },
    Error {
        message: String,
    },
}

/// Page the session was last redirected to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub page: &'static str,
    pub url: &'static str,
}

impl From<Destination> for Location {
    fn from(destination: Destination) -> Self {
        Self {
            page: destination.page(),
            url: destination.url(),
        }
    }
}

/// Point-in-time view of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub page: PageContext,
    pub phase: DialoguePhase,
    pub busy: bool,
    pub state: DialogueState,
    pub pending_action: Option<PendingAction>,
    /// `None` until a scheduled redirect has fired
    pub location: Option<Location>,
    pub history: Vec<Entry>,
}

impl SessionSnapshot {
    pub fn capture(
        context: &SessionContext,
        state: &DialogueState,
        location: Option<Destination>,
        history: &History,
    ) -> Self {
        Self {
            session_id: context.session_id.clone(),
            page: context.page.clone(),
            phase: state.phase(),
            busy: state.is_busy(),
            state: state.clone(),
            pending_action: state.pending_action(),
            location: location.map(Location::from),
            history: history.entries().to_vec(),
        }
    }
}

/// Handle to interact with a running session
#[derive(Clone, Debug)]
pub struct SessionHandle {
    event_tx: mpsc::Sender<Envelope>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
    cancel: CancellationToken,
}

impl SessionHandle {
    /// Submit a user message; resolves once the message has been accepted or rejected
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), SessionError> {
        if self.is_closed() {
            return Err(SessionError::Closed);
        }

        let (ack_tx, ack_rx) = oneshot::channel();
        self.event_tx
            .send(Envelope::submit(text.into(), ack_tx))
            .await
            .map_err(|_| SessionError::Closed)?;

        ack_rx
            .await
            .map_err(|_| SessionError::Closed)?
            .map_err(SessionError::from)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SseEvent> {
        self.broadcast_tx.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Stop the actor, cancelling oracle calls and scheduled navigations
    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Manager for all session runtimes
pub struct SessionManager {
    chat: Arc<dyn ChatOracle>,
    intent: Arc<dyn IntentOracle>,
    handoff: Arc<dyn HandoffStore>,
    settings: SessionSettings,
    sessions: SessionMap,
}

impl SessionManager {
    pub fn new(
        chat: Arc<dyn ChatOracle>,
        intent: Arc<dyn IntentOracle>,
        handoff: Arc<dyn HandoffStore>,
        settings: SessionSettings,
    ) -> Self {
        Self {
            chat,
            intent,
            handoff,
            settings,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Start a new session on `page` and return its handle
    pub async fn create(&self, page: PageContext) -> SessionHandle {
        let session_id = uuid::Uuid::new_v4().to_string();
        let context = SessionContext::new(&session_id, page);

        let (runtime, handle): (SharedRuntime, SessionHandle) = SessionRuntime::new(
            context,
            self.chat.clone(),
            self.intent.clone(),
            self.handoff.clone(),
            self.settings,
        );

        self.sessions
            .write()
            .await
            .insert(session_id.clone(), handle.clone());

        // Forget the session once its actor stops, however it stopped
        let sessions = self.sessions.clone();
        let handoff = self.handoff.clone();
        tokio::spawn(async move {
            runtime.run().await;
            sessions.write().await.remove(&session_id);
            handoff.clear_session(&session_id);
            tracing::info!(session_id = %session_id, "Session runtime finished");
        });

        handle
    }

    pub async fn get(&self, session_id: &str) -> Result<SessionHandle, SessionError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .filter(|handle| !handle.is_closed())
            .cloned()
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    pub async fn submit(&self, session_id: &str, text: &str) -> Result<(), SessionError> {
        self.get(session_id).await?.submit(text).await
    }

    pub async fn snapshot(&self, session_id: &str) -> Result<SessionSnapshot, SessionError> {
        Ok(self.get(session_id).await?.snapshot())
    }

    /// Subscribe to session updates along with the state at subscription time
    pub async fn subscribe(
        &self,
        session_id: &str,
    ) -> Result<(SessionSnapshot, broadcast::Receiver<SseEvent>), SessionError> {
        let handle = self.get(session_id).await?;
        let rx = handle.subscribe();
        Ok((handle.snapshot(), rx))
    }

    /// Read the session's template handoff slot
    pub async fn handoff(&self, session_id: &str) -> Result<Option<String>, SessionError> {
        self.get(session_id).await?;
        Ok(self.handoff.get(session_id, TEMPLATE_KEY))
    }

    /// Close a session, discarding its state and handoff slot
    pub async fn close(&self, session_id: &str) -> Result<(), SessionError> {
        let handle = self
            .sessions
            .write()
            .await
            .remove(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;

        handle.close();
        self.handoff.clear_session(session_id);
        tracing::info!(session_id = %session_id, "Session closed");
        Ok(())
    }
}
