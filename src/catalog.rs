//! Action catalog
//!
//! A pure dispatch table from intent to dialogue script. The catalog holds no
//! state: it produces the pending action the dialogue installs, and looks the
//! script up again by identifier when the user answers.

mod intent;
mod scripts;
mod slots;

pub use intent::{Intent, ScriptedAction};
pub use slots::Slots;
#[cfg(test)]
pub use scripts::DEFAULT_SUBJECT;

use scripts::AcceptStep;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;

/// Delay before redirecting after an accept/decline answer
pub const ANSWER_REDIRECT_DELAY: Duration = Duration::from_millis(800);

/// Page the session started from
pub const HOME_PAGE: &str = "HOME";

/// Opaque identifier of the page/domain a session started from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageContext(String);

impl PageContext {
    pub fn new(page: impl Into<String>) -> Self {
        Self(page.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the session is already on the destination's page
    pub fn is_on(&self, destination: Destination) -> bool {
        self.0 == destination.page()
    }
}

impl Default for PageContext {
    fn default() -> Self {
        Self::new(HOME_PAGE)
    }
}

impl fmt::Display for PageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Portal pages the dialogue can redirect to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Destination {
    FktpQueue,
    FrtlQueue,
    DataChange,
    Registration,
}

impl Destination {
    /// Page identifier compared against the session's page context
    pub fn page(self) -> &'static str {
        match self {
            Destination::FktpQueue => "FKTP",
            Destination::FrtlQueue => "FRTL",
            Destination::DataChange => "PERUBAHAN_DATA",
            Destination::Registration => "REGISTER",
        }
    }

    pub fn url(self) -> &'static str {
        match self {
            Destination::FktpQueue => "ftp.html",
            Destination::FrtlQueue => "ftl.html",
            Destination::DataChange => "perubahandata.html",
            Destination::Registration => "register.html",
        }
    }

    pub fn to_json(self) -> Value {
        json!({ "page": self.page(), "url": self.url() })
    }

    /// `Some(self)` unless the session is already on this page
    fn redirect_from(self, page: &PageContext) -> Option<Destination> {
        (!page.is_on(self)).then_some(self)
    }
}

/// A proposal awaiting a yes/no answer.
///
/// Carries the script identifier and slots, never behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confirmation {
    pub action: ScriptedAction,
    pub page: PageContext,
    pub slots: Slots,
}

/// Waiting for the user to send the filled-in template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateWait {
    pub target: Destination,
    /// `None` when the session is already on the target page
    pub redirect: Option<Destination>,
}

/// A navigation request to be performed after a delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub destination: Destination,
    pub delay: Duration,
}

/// Result of running an accept or decline behavior
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outcome {
    pub messages: Vec<String>,
    pub template: Option<TemplateWait>,
    pub navigation: Option<Navigation>,
}

/// What the dialogue should do with a classified intent
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Propose an action and wait for confirmation
    Propose {
        confirmation: Confirmation,
        message: String,
    },
    /// Canned informational answer, no state change
    Inform { message: &'static str },
    /// Plain chat answer stands
    Ignore,
}

/// Map a classified intent to its dialogue step
pub fn dispatch(intent: Intent, slots: Slots, page: &PageContext) -> Dispatch {
    match intent.scripted() {
        Some(action) => {
            let message = (action.script().proposal)(&slots);
            Dispatch::Propose {
                confirmation: Confirmation {
                    action,
                    page: page.clone(),
                    slots,
                },
                message,
            }
        }
        None => match intent {
            Intent::PayBill => Dispatch::Inform {
                message: scripts::PAY_BILL_INFO,
            },
            Intent::ReactivateBpjs => Dispatch::Inform {
                message: scripts::REACTIVATE_BPJS_INFO,
            },
            Intent::Login => Dispatch::Inform {
                message: scripts::LOGIN_INFO,
            },
            _ => Dispatch::Ignore,
        },
    }
}

/// Run the accept behavior of a confirmed proposal
pub fn accept(confirmation: &Confirmation) -> Outcome {
    let script = confirmation.action.script();
    let redirect = script.destination.redirect_from(&confirmation.page);

    match script.on_accept {
        AcceptStep::Template { prompt } => Outcome {
            messages: vec![prompt.to_string()],
            template: Some(TemplateWait {
                target: script.destination,
                redirect,
            }),
            navigation: None,
        },
        AcceptStep::Guide { help } => Outcome {
            messages: vec![help.to_string()],
            template: None,
            navigation: redirect.map(|destination| Navigation {
                destination,
                delay: ANSWER_REDIRECT_DELAY,
            }),
        },
    }
}

/// Run the decline behavior: only the conditional redirect
pub fn decline(confirmation: &Confirmation) -> Outcome {
    let script = confirmation.action.script();
    Outcome {
        messages: vec![],
        template: None,
        navigation: script
            .destination
            .redirect_from(&confirmation.page)
            .map(|destination| Navigation {
                destination,
                delay: ANSWER_REDIRECT_DELAY,
            }),
    }
}
