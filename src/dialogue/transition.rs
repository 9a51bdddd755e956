//! Pure state transition function
//!
//! Every (state, event) pair has a defined result: a new state with its
//! effects, or a `TransitionError`. No I/O happens here.

use super::{DialogueState, Effect, Event, SessionContext};
use crate::catalog::{self, Confirmation, Dispatch, Navigation, TemplateWait};
use crate::oracle::OracleErrorKind;
use std::time::Duration;
use thiserror::Error;

/// Answers accepted as "yes" to a proposal
pub const AFFIRMATIVE: [&str; 6] = ["ya", "iya", "boleh", "ok", "oke", "lanjut"];

/// Answers accepted as "no" to a proposal
pub const NEGATIVE: [&str; 6] = ["tidak", "ga", "gak", "nggak", "jangan", "no"];

pub const ACCEPT_ACK: &str = "Baik, saya jalankan bantuannya ya. 👌";

pub const DECLINE_ACK: &str =
    "Baik, saya tidak akan mengisi otomatis. Saya arahkan dan jelaskan langkah umumnya saja ya. 🙏";

pub const TEMPLATE_ACK: &str = concat!(
    "Terima kasih, datanya sudah saya catat. Sekarang saya arahkan ke halaman yang sesuai. ",
    "Nanti silakan salin isian yang tadi Anda kirim ke form antrean sebelum menekan tombol Simpan."
);

/// Shown when the chat oracle answered with an error status
pub const BACKEND_APOLOGY: &str =
    "Maaf, ada kendala saat menghubungi SANI di backend. Coba beberapa saat lagi ya.";

/// Shown when the chat oracle could not be reached
pub const CONNECTION_APOLOGY: &str = "Maaf, terjadi kendala koneksi ke server SANI di backend.";

/// Delay before redirecting after the template was captured
pub const TEMPLATE_REDIRECT_DELAY: Duration = Duration::from_millis(1600);

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: DialogueState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: DialogueState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("SANI is still answering the previous message")]
    Busy,
    #[error("Message text must not be empty")]
    EmptyMessage,
    #[error("Unexpected {event} while {state}")]
    UnexpectedEvent {
        event: &'static str,
        state: &'static str,
    },
}

/// How a message answers a pending proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Unrecognised,
}

/// Classify a message against the yes/no vocabularies (trimmed, case-insensitive)
pub fn classify_answer(text: &str) -> Answer {
    let lower = text.trim().to_lowercase();
    if AFFIRMATIVE.contains(&lower.as_str()) {
        Answer::Yes
    } else if NEGATIVE.contains(&lower.as_str()) {
        Answer::No
    } else {
        Answer::Unrecognised
    }
}

/// Apology for a failed chat request
pub fn apology_for(kind: OracleErrorKind) -> &'static str {
    match kind {
        OracleErrorKind::Status(_) | OracleErrorKind::EmptyReply => BACKEND_APOLOGY,
        OracleErrorKind::Network | OracleErrorKind::Timeout | OracleErrorKind::Malformed => {
            CONNECTION_APOLOGY
        }
    }
}

/// Pure transition function
pub fn transition(
    state: &DialogueState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // User messages
        // ============================================================
        (_, Event::UserMessage { text }) if text.trim().is_empty() => {
            Err(TransitionError::EmptyMessage)
        }

        (DialogueState::ChatRequesting { .. } | DialogueState::IntentRequesting { .. }, Event::UserMessage { .. }) => {
            Err(TransitionError::Busy)
        }

        // AwaitingTemplate + any text -> Idle, text captured as-is
        (DialogueState::AwaitingTemplate { template }, Event::UserMessage { text }) => {
            Ok(capture_template(template, text.trim()))
        }

        // AwaitingConfirmation + yes/no -> answer consumed; anything else falls through
        (DialogueState::AwaitingConfirmation { confirmation }, Event::UserMessage { text }) => {
            let text = text.trim();
            Ok(match classify_answer(text) {
                Answer::Yes => answer_proposal(
                    text,
                    ACCEPT_ACK,
                    catalog::accept(confirmation),
                ),
                Answer::No => answer_proposal(
                    text,
                    DECLINE_ACK,
                    catalog::decline(confirmation),
                ),
                Answer::Unrecognised => start_turn(text, Some(confirmation.clone())),
            })
        }

        // Idle + UserMessage -> ChatRequesting
        (DialogueState::Idle, Event::UserMessage { text }) => Ok(start_turn(text.trim(), None)),

        // ============================================================
        // Chat oracle
        // ============================================================

        // ChatRequesting + ChatReply -> IntentRequesting
        (DialogueState::ChatRequesting { text, stale }, Event::ChatReply { reply }) => {
            Ok(TransitionResult::new(DialogueState::IntentRequesting {
                text: text.clone(),
                stale: stale.clone(),
            })
            .with_effect(Effect::RecordExchange {
                user: text.clone(),
                assistant: reply.clone(),
            })
            .with_effect(Effect::Reply { text: reply })
            .with_effect(Effect::RequestIntent {
                message: text.clone(),
            })
            .with_effect(Effect::PublishState))
        }

        // ChatRequesting + ChatFailed -> previous state, history untouched
        (DialogueState::ChatRequesting { stale, .. }, Event::ChatFailed { kind, .. }) => {
            Ok(TransitionResult::new(DialogueState::settle(stale.clone()))
                .with_effect(Effect::reply(apology_for(kind)))
                .with_effect(Effect::PublishState))
        }

        // ============================================================
        // NLU oracle
        // ============================================================
        (DialogueState::IntentRequesting { stale, .. }, Event::IntentParsed { intent, slots }) => {
            Ok(match catalog::dispatch(intent, slots, &context.page) {
                Dispatch::Propose {
                    confirmation,
                    message,
                } => TransitionResult::new(DialogueState::AwaitingConfirmation { confirmation })
                    .with_effect(Effect::Reply { text: message })
                    .with_effect(Effect::PublishState),
                Dispatch::Inform { message } => {
                    TransitionResult::new(DialogueState::settle(stale.clone()))
                        .with_effect(Effect::reply(message))
                        .with_effect(Effect::PublishState)
                }
                Dispatch::Ignore => TransitionResult::new(DialogueState::settle(stale.clone()))
                    .with_effect(Effect::PublishState),
            })
        }

        // NLU failures degrade silently to chat-only
        (DialogueState::IntentRequesting { stale, .. }, Event::IntentFailed { .. }) => {
            Ok(TransitionResult::new(DialogueState::settle(stale.clone()))
                .with_effect(Effect::PublishState))
        }

        // ============================================================
        // Everything else
        // ============================================================
        (state, event) => Err(TransitionError::UnexpectedEvent {
            event: event.name(),
            state: state.name(),
        }),
    }
}

/// Echo the message and ask the chat oracle
fn start_turn(text: &str, stale: Option<Confirmation>) -> TransitionResult {
    TransitionResult::new(DialogueState::ChatRequesting {
        text: text.to_string(),
        stale,
    })
    .with_effect(Effect::echo_user(text))
    .with_effect(Effect::RequestChat {
        message: text.to_string(),
    })
    .with_effect(Effect::PublishState)
}

/// Consume a yes/no answer and run the catalog outcome
fn answer_proposal(text: &str, ack: &str, outcome: catalog::Outcome) -> TransitionResult {
    let new_state = match outcome.template {
        Some(template) => DialogueState::AwaitingTemplate { template },
        None => DialogueState::Idle,
    };

    TransitionResult::new(new_state)
        .with_effect(Effect::echo_user(text))
        .with_effect(Effect::reply(ack))
        .with_effects(outcome.messages.into_iter().map(Effect::reply))
        .with_effects(
            outcome
                .navigation
                .map(|navigation| Effect::Navigate { navigation }),
        )
        .with_effect(Effect::PublishState)
}

/// Capture the filled-in template and schedule the redirect
fn capture_template(template: &TemplateWait, text: &str) -> TransitionResult {
    TransitionResult::new(DialogueState::Idle)
        .with_effect(Effect::echo_user(text))
        .with_effect(Effect::StoreHandoff {
            value: text.to_string(),
        })
        .with_effect(Effect::reply(TEMPLATE_ACK))
        .with_effects(template.redirect.map(|destination| Effect::Navigate {
            navigation: Navigation {
                destination,
                delay: TEMPLATE_REDIRECT_DELAY,
            },
        }))
        .with_effect(Effect::PublishState)
}
