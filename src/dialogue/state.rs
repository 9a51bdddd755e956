//! Dialogue state types

use crate::catalog::{Confirmation, PageContext, TemplateWait};
use serde::{Deserialize, Serialize};

/// The single outstanding proposal of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PendingAction {
    /// Waiting for a yes/no answer
    Confirmation(Confirmation),
    /// Waiting for the filled-in template
    WaitingTemplate(TemplateWait),
}

/// Dialogue phase as seen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DialoguePhase {
    Idle,
    AwaitingConfirmation,
    AwaitingTemplate,
}

/// Dialogue state
///
/// The two `*Requesting` states mark a turn in flight. They keep the
/// confirmation that was pending when the message fell through so it can be
/// re-armed if the turn ends without a new proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogueState {
    /// No pending action
    #[default]
    Idle,

    /// A proposal was made, waiting for yes/no
    AwaitingConfirmation { confirmation: Confirmation },

    /// Waiting for the user to send the filled-in template
    AwaitingTemplate { template: TemplateWait },

    /// Chat oracle request in flight
    ChatRequesting {
        text: String,
        stale: Option<Confirmation>,
    },

    /// NLU oracle request in flight, chat reply already shown
    IntentRequesting {
        text: String,
        stale: Option<Confirmation>,
    },
}

impl DialogueState {
    /// State to return to when a turn ends without a new proposal
    pub fn settle(stale: Option<Confirmation>) -> Self {
        match stale {
            Some(confirmation) => DialogueState::AwaitingConfirmation { confirmation },
            None => DialogueState::Idle,
        }
    }

    /// Check if a turn is in flight
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            DialogueState::ChatRequesting { .. } | DialogueState::IntentRequesting { .. }
        )
    }

    pub fn pending_action(&self) -> Option<PendingAction> {
        match self {
            DialogueState::Idle => None,
            DialogueState::AwaitingConfirmation { confirmation } => {
                Some(PendingAction::Confirmation(confirmation.clone()))
            }
            DialogueState::AwaitingTemplate { template } => {
                Some(PendingAction::WaitingTemplate(template.clone()))
            }
            DialogueState::ChatRequesting { stale, .. }
            | DialogueState::IntentRequesting { stale, .. } => {
                stale.clone().map(PendingAction::Confirmation)
            }
        }
    }

    pub fn phase(&self) -> DialoguePhase {
        match self.pending_action() {
            None => DialoguePhase::Idle,
            Some(PendingAction::Confirmation(_)) => DialoguePhase::AwaitingConfirmation,
            Some(PendingAction::WaitingTemplate(_)) => DialoguePhase::AwaitingTemplate,
        }
    }

    /// Short state name for logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            DialogueState::Idle => "idle",
            DialogueState::AwaitingConfirmation { .. } => "awaiting_confirmation",
            DialogueState::AwaitingTemplate { .. } => "awaiting_template",
            DialogueState::ChatRequesting { .. } => "chat_requesting",
            DialogueState::IntentRequesting { .. } => "intent_requesting",
        }
    }
}

/// Context for a session (immutable configuration)
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    pub page: PageContext,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>, page: PageContext) -> Self {
        Self {
            session_id: session_id.into(),
            page,
        }
    }
}
