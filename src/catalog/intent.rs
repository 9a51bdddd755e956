//! Intent enumeration returned by the NLU oracle

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified purpose of a user utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    RegisterFktpQueue,
    RegisterFrtlQueue,
    UpdateProfile,
    RegisterAccount,
    PayBill,
    ReactivateBpjs,
    Login,
    Other,
}

impl Intent {
    pub const ALL: [Intent; 8] = [
        Intent::RegisterFktpQueue,
        Intent::RegisterFrtlQueue,
        Intent::UpdateProfile,
        Intent::RegisterAccount,
        Intent::PayBill,
        Intent::ReactivateBpjs,
        Intent::Login,
        Intent::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::RegisterFktpQueue => "REGISTER_FKTP_QUEUE",
            Intent::RegisterFrtlQueue => "REGISTER_FRTL_QUEUE",
            Intent::UpdateProfile => "UPDATE_PROFILE",
            Intent::RegisterAccount => "REGISTER_ACCOUNT",
            Intent::PayBill => "PAY_BILL",
            Intent::ReactivateBpjs => "REACTIVATE_BPJS",
            Intent::Login => "LOGIN",
            Intent::Other => "OTHER",
        }
    }

    /// Decode an oracle intent name.
    ///
    /// Matching is case-insensitive. Missing or unrecognised names decode to
    /// `Other` so the dialogue falls back to a plain chat answer.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Intent::Other;
        };
        let upper = raw.to_uppercase();
        Self::ALL
            .into_iter()
            .find(|intent| intent.as_str() == upper)
            .unwrap_or_else(|| {
                tracing::debug!(intent = %raw, "Unrecognised intent, treating as OTHER");
                Intent::Other
            })
    }

    /// The catalog script for intents that open a confirmation step
    pub fn scripted(self) -> Option<ScriptedAction> {
        match self {
            Intent::RegisterFktpQueue => Some(ScriptedAction::RegisterFktpQueue),
            Intent::RegisterFrtlQueue => Some(ScriptedAction::RegisterFrtlQueue),
            Intent::UpdateProfile => Some(ScriptedAction::UpdateProfile),
            Intent::RegisterAccount => Some(ScriptedAction::RegisterAccount),
            Intent::PayBill | Intent::ReactivateBpjs | Intent::Login | Intent::Other => None,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intents that carry a confirmation script in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScriptedAction {
    RegisterFktpQueue,
    RegisterFrtlQueue,
    UpdateProfile,
    RegisterAccount,
}

impl ScriptedAction {
    pub fn intent(self) -> Intent {
        match self {
            ScriptedAction::RegisterFktpQueue => Intent::RegisterFktpQueue,
            ScriptedAction::RegisterFrtlQueue => Intent::RegisterFrtlQueue,
            ScriptedAction::UpdateProfile => Intent::UpdateProfile,
            ScriptedAction::RegisterAccount => Intent::RegisterAccount,
        }
    }
}
