//! Session runtime executor

use super::{SessionHandle, SessionSettings, SessionSnapshot, SseEvent};

use crate::catalog::Destination;
use crate::dialogue::{transition, DialogueState, Effect, Event, SessionContext, TransitionError};
use crate::handoff::{HandoffStore, TEMPLATE_KEY};
use crate::history::{History, Message};
use crate::oracle::{ChatOracle, IntentOracle};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Work queued for the session actor
pub(crate) enum Envelope {
    /// Dialogue event, with an optional reply slot for the submitter
    Dialogue {
        event: Event,
        ack: Option<oneshot::Sender<Result<(), TransitionError>>>,
    },
    /// A scheduled redirect fired
    Navigated { destination: Destination },
}

impl Envelope {
    pub fn submit(text: String, ack: oneshot::Sender<Result<(), TransitionError>>) -> Self {
        Self::Dialogue {
            event: Event::UserMessage { text },
            ack: Some(ack),
        }
    }

    fn oracle(event: Event) -> Self {
        Self::Dialogue { event, ack: None }
    }
}

/// Generic session runtime that can work with any chat and intent oracle
pub struct SessionRuntime<C, I>
where
    C: ChatOracle + 'static,
    I: IntentOracle + 'static,
{
    context: SessionContext,
    state: DialogueState,
    /// Where the last fired redirect sent the user
    location: Option<Destination>,
    history: History,
    chat: Arc<C>,
    intent: Arc<I>,
    handoff: Arc<dyn HandoffStore>,
    settings: SessionSettings,
    last_activity: Instant,
    event_rx: mpsc::Receiver<Envelope>,
    event_tx: mpsc::Sender<Envelope>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    /// Cancelled when the session closes; parent of every background task
    cancel: CancellationToken,
}

impl<C, I> SessionRuntime<C, I>
where
    C: ChatOracle + 'static,
    I: IntentOracle + 'static,
{
    /// Create a runtime in the idle state and the handle used to drive it
    pub fn new(
        context: SessionContext,
        chat: C,
        intent: I,
        handoff: Arc<dyn HandoffStore>,
        settings: SessionSettings,
    ) -> (Self, SessionHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);
        let state = DialogueState::Idle;
        let history = History::new();
        let (snapshot_tx, snapshot_rx) =
            watch::channel(SessionSnapshot::capture(&context, &state, None, &history));
        let cancel = CancellationToken::new();

        let handle = SessionHandle {
            event_tx: event_tx.clone(),
            broadcast_tx: broadcast_tx.clone(),
            snapshot_rx,
            cancel: cancel.clone(),
        };

        let runtime = Self {
            context,
            state,
            location: None,
            history,
            chat: Arc::new(chat),
            intent: Arc::new(intent),
            handoff,
            settings,
            last_activity: Instant::now(),
            event_rx,
            event_tx,
            broadcast_tx,
            snapshot_tx,
            cancel,
        };

        (runtime, handle)
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.context.session_id, page = %self.context.page, "Starting session runtime");

        loop {
            let idle_deadline = self.idle_deadline();
            tokio::select! {
                biased;

                () = self.cancel.cancelled() => break,

                Some(envelope) = self.event_rx.recv() => {
                    self.last_activity = Instant::now();
                    self.handle_envelope(envelope);
                }

                () = idle_expiry(idle_deadline) => {
                    if self.state.is_busy() {
                        // Oracle calls are bounded by their own timeout
                        self.last_activity = Instant::now();
                        continue;
                    }
                    tracing::info!(session_id = %self.context.session_id, "Session idle, closing");
                    self.cancel.cancel();
                    break;
                }

                else => break,
            }
        }

        tracing::info!(session_id = %self.context.session_id, "Session runtime stopped");
    }

    fn idle_deadline(&self) -> Option<Instant> {
        self.settings
            .idle_timeout
            .map(|timeout| self.last_activity + timeout)
    }

    fn handle_envelope(&mut self, envelope: Envelope) {
        match envelope {
            Envelope::Dialogue { event, ack } => {
                let result = self.process_event(event);

                match ack {
                    Some(ack) => {
                        let _ = ack.send(result);
                    }
                    None => {
                        if let Err(e) = result {
                            tracing::warn!(session_id = %self.context.session_id, error = %e, "Dropped oracle event");
                            let _ = self.broadcast_tx.send(SseEvent::Error {
                                message: e.to_string(),
                            });
                        }
                    }
                }
            }

            Envelope::Navigated { destination } => {
                tracing::info!(
                    session_id = %self.context.session_id,
                    page = destination.page(),
                    "Navigating"
                );
                self.location = Some(destination);
                self.snapshot_tx.send_replace(self.capture());
                let _ = self.broadcast_tx.send(SseEvent::Navigate {
                    destination: destination.to_json(),
                });
            }
        }
    }

    fn capture(&self) -> SessionSnapshot {
        SessionSnapshot::capture(&self.context, &self.state, self.location, &self.history)
    }

    fn process_event(&mut self, event: Event) -> Result<(), TransitionError> {
        let event_name = event.name();

        // Pure state transition
        let result = match transition(&self.state, &self.context, event) {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(
                    session_id = %self.context.session_id,
                    event = event_name,
                    state = self.state.name(),
                    error = %e,
                    "Event rejected"
                );
                return Err(e);
            }
        };

        tracing::debug!(
            session_id = %self.context.session_id,
            event = event_name,
            from = self.state.name(),
            to = result.new_state.name(),
            "Transition"
        );
        self.state = result.new_state;

        for effect in result.effects {
            self.execute_effect(effect);
        }

        Ok(())
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::EchoUser { text } => self.broadcast_message(Message::user(text)),

            Effect::Reply { text } => self.broadcast_message(Message::assistant(text)),

            Effect::RequestChat { message } => {
                let chat = self.chat.clone();
                let event_tx = self.event_tx.clone();
                let cancel_token = self.cancel.child_token();
                let history = self.history.window(self.settings.history_window);
                let session_id = self.context.session_id.clone();

                tokio::spawn(async move {
                    tracing::debug!(session_id = %session_id, history_len = history.len(), "Requesting chat reply (background)");

                    tokio::select! {
                        biased;

                        () = cancel_token.cancelled() => {
                            tracing::info!(session_id = %session_id, "Chat request cancelled");
                        }

                        result = chat.reply(&history, &message) => {
                            let event = match result {
                                Ok(reply) => Event::ChatReply { reply },
                                Err(e) => Event::ChatFailed {
                                    kind: e.kind,
                                    message: e.message,
                                },
                            };
                            let _ = event_tx.send(Envelope::oracle(event)).await;
                        }
                    }
                });
            }

            Effect::RecordExchange { user, assistant } => {
                self.history.record_exchange(user, assistant);
                tracing::debug!(session_id = %self.context.session_id, history_len = self.history.len(), "Exchange recorded");
            }

            Effect::RequestIntent { message } => {
                let intent = self.intent.clone();
                let event_tx = self.event_tx.clone();
                let cancel_token = self.cancel.child_token();
                let page = self.context.page.clone();
                let session_id = self.context.session_id.clone();

                tokio::spawn(async move {
                    tokio::select! {
                        biased;

                        () = cancel_token.cancelled() => {
                            tracing::info!(session_id = %session_id, "Intent request cancelled");
                        }

                        result = intent.classify(&message, &page) => {
                            let event = match result {
                                Ok(classification) => {
                                    tracing::info!(
                                        session_id = %session_id,
                                        intent = ?classification.intent,
                                        has_slots = !classification.slots.is_empty(),
                                        "Intent classified"
                                    );
                                    Event::IntentParsed {
                                        intent: classification.intent,
                                        slots: classification.slots,
                                    }
                                }
                                Err(e) => {
                                    tracing::warn!(session_id = %session_id, error = %e, "Intent classification failed, continuing without it");
                                    Event::IntentFailed { message: e.message }
                                }
                            };
                            let _ = event_tx.send(Envelope::oracle(event)).await;
                        }
                    }
                });
            }

            Effect::StoreHandoff { value } => {
                if let Err(e) = self
                    .handoff
                    .put(&self.context.session_id, TEMPLATE_KEY, &value)
                {
                    tracing::warn!(session_id = %self.context.session_id, error = %e, "Failed to store template handoff");
                }
            }

            Effect::Navigate { navigation } => {
                let event_tx = self.event_tx.clone();
                let cancel_token = self.cancel.child_token();
                let session_id = self.context.session_id.clone();

                tokio::spawn(async move {
                    tokio::select! {
                        biased;

                        () = cancel_token.cancelled() => {
                            tracing::debug!(session_id = %session_id, "Navigation cancelled");
                        }

                        () = tokio::time::sleep(navigation.delay) => {
                            let _ = event_tx
                                .send(Envelope::Navigated {
                                    destination: navigation.destination,
                                })
                                .await;
                        }
                    }
                });
            }

            Effect::PublishState => {
                let snapshot = self.capture();
                let _ = self.broadcast_tx.send(SseEvent::StateChange {
                    state: json!({
                        "type": self.state.name(),
                        "phase": snapshot.phase,
                        "busy": snapshot.busy,
                        "pending_action": snapshot.pending_action,
                        "location": snapshot.location,
                    }),
                });
                self.snapshot_tx.send_replace(snapshot);
            }
        }
    }

    fn broadcast_message(&self, message: Message) {
        match serde_json::to_value(&message) {
            Ok(message) => {
                let _ = self.broadcast_tx.send(SseEvent::Message { message });
            }
            Err(e) => {
                tracing::error!(session_id = %self.context.session_id, error = %e, "Failed to serialize message");
            }
        }
    }
}

/// Resolves at `deadline`, or never when there is none
async fn idle_expiry(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
