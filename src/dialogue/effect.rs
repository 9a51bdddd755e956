//! Effects produced by state transitions

use crate::catalog::Navigation;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Show the user's own message
    EchoUser { text: String },

    /// Show a bot message
    Reply { text: String },

    /// Ask the chat oracle for a reply (spawns as background task)
    RequestChat { message: String },

    /// Append a completed exchange to the history
    RecordExchange { user: String, assistant: String },

    /// Ask the NLU oracle for intent and slots (spawns as background task)
    RequestIntent { message: String },

    /// Store the captured template in the handoff slot
    StoreHandoff { value: String },

    /// Redirect the user after a delay
    Navigate { navigation: Navigation },

    /// Notify connected clients of the new state
    PublishState,
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply { text: text.into() }
    }

    pub fn echo_user(text: impl Into<String>) -> Self {
        Effect::EchoUser { text: text.into() }
    }

    /// Whether this effect consults an oracle
    #[cfg(test)]
    pub fn is_oracle_request(&self) -> bool {
        matches!(self, Effect::RequestChat { .. } | Effect::RequestIntent { .. })
    }
}
