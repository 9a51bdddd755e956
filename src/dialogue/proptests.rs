//! Property-based tests for the dialogue state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::catalog::{Confirmation, Destination, Intent, PageContext, ScriptedAction, Slots, TemplateWait};
use crate::oracle::OracleErrorKind;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> SessionContext {
    SessionContext::new("test-session", PageContext::default())
}

fn count_replies(result: &TransitionResult, text: &str) -> usize {
    result
        .effects
        .iter()
        .filter(|e| matches!(e, Effect::Reply { text: t } if t == text))
        .count()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_action() -> impl Strategy<Value = ScriptedAction> {
    prop_oneof![
        Just(ScriptedAction::RegisterFktpQueue),
        Just(ScriptedAction::RegisterFrtlQueue),
        Just(ScriptedAction::UpdateProfile),
        Just(ScriptedAction::RegisterAccount),
    ]
}

fn arb_page() -> impl Strategy<Value = PageContext> {
    prop_oneof![
        Just("HOME"),
        Just("FKTP"),
        Just("FRTL"),
        Just("PERUBAHAN_DATA"),
        Just("REGISTER"),
    ]
    .prop_map(PageContext::new)
}

fn arb_slots() -> impl Strategy<Value = Slots> {
    proptest::collection::btree_map(
        prop_oneof![Just("nama"), Just("field"), Just("rs")].prop_map(String::from),
        proptest::option::of("[a-zA-Z ]{0,12}"),
        0..3,
    )
    .prop_map(|map| map.into_iter().collect())
}

fn arb_confirmation() -> impl Strategy<Value = Confirmation> {
    (arb_action(), arb_page(), arb_slots()).prop_map(|(action, page, slots)| Confirmation {
        action,
        page,
        slots,
    })
}

fn arb_destination() -> impl Strategy<Value = Destination> {
    prop_oneof![
        Just(Destination::FktpQueue),
        Just(Destination::FrtlQueue),
        Just(Destination::DataChange),
        Just(Destination::Registration),
    ]
}

fn arb_template() -> impl Strategy<Value = TemplateWait> {
    (arb_destination(), any::<bool>()).prop_map(|(target, redirect)| TemplateWait {
        target,
        redirect: redirect.then_some(target),
    })
}

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9:,. ]{0,40}"
}

/// Non-empty text that is neither a yes nor a no answer
fn arb_free_text() -> impl Strategy<Value = String> {
    "[a-z]{3,10} [a-z]{3,10}"
}

fn arb_state() -> impl Strategy<Value = DialogueState> {
    prop_oneof![
        Just(DialogueState::Idle),
        arb_confirmation().prop_map(|confirmation| DialogueState::AwaitingConfirmation { confirmation }),
        arb_template().prop_map(|template| DialogueState::AwaitingTemplate { template }),
        (arb_free_text(), proptest::option::of(arb_confirmation()))
            .prop_map(|(text, stale)| DialogueState::ChatRequesting { text, stale }),
        (arb_free_text(), proptest::option::of(arb_confirmation()))
            .prop_map(|(text, stale)| DialogueState::IntentRequesting { text, stale }),
    ]
}

fn arb_error_kind() -> impl Strategy<Value = OracleErrorKind> {
    prop_oneof![
        Just(OracleErrorKind::Network),
        Just(OracleErrorKind::Timeout),
        Just(OracleErrorKind::Malformed),
        Just(OracleErrorKind::EmptyReply),
        (400u16..600).prop_map(OracleErrorKind::Status),
    ]
}

fn arb_intent() -> impl Strategy<Value = Intent> {
    proptest::sample::select(Intent::ALL.to_vec())
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_text().prop_map(|text| Event::UserMessage { text }),
        prop_oneof![
            Just("ya"),
            Just("Oke"),
            Just("tidak"),
            Just("GAK")
        ]
        .prop_map(|t| Event::UserMessage {
            text: t.to_string()
        }),
        arb_text().prop_map(|reply| Event::ChatReply { reply }),
        (arb_error_kind(), arb_text())
            .prop_map(|(kind, message)| Event::ChatFailed { kind, message }),
        (arb_intent(), arb_slots()).prop_map(|(intent, slots)| Event::IntentParsed { intent, slots }),
        arb_text().prop_map(|message| Event::IntentFailed { message }),
    ]
}

fn yes_variant() -> impl Strategy<Value = String> {
    (proptest::sample::select(AFFIRMATIVE.to_vec()), any::<bool>(), any::<bool>()).prop_map(
        |(word, upper, padded)| {
            let word = if upper {
                word.to_uppercase()
            } else {
                word.to_string()
            };
            if padded {
                format!("  {word} ")
            } else {
                word
            }
        },
    )
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// The transition function is total and phase always agrees with the pending action
    #[test]
    fn prop_transition_total_and_consistent(state in arb_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, &test_context(), event) {
            let phase = result.new_state.phase();
            match result.new_state.pending_action() {
                None => prop_assert_eq!(phase, DialoguePhase::Idle),
                Some(PendingAction::Confirmation(_)) => {
                    prop_assert_eq!(phase, DialoguePhase::AwaitingConfirmation);
                }
                Some(PendingAction::WaitingTemplate(_)) => {
                    prop_assert_eq!(phase, DialoguePhase::AwaitingTemplate);
                }
            }
            prop_assert!(result.effects.contains(&Effect::PublishState));
        }
    }

    /// Random event sequences never leave the machine in a state it cannot leave
    #[test]
    fn prop_event_sequences(events in proptest::collection::vec(arb_event(), 1..20)) {
        let mut state = DialogueState::Idle;
        for event in events {
            if let Ok(result) = transition(&state, &test_context(), event) {
                state = result.new_state;
            }
            // a busy session always accepts an oracle answer
            if state.is_busy() {
                let answer = match &state {
                    DialogueState::ChatRequesting { .. } => Event::ChatFailed {
                        kind: OracleErrorKind::Network,
                        message: String::new(),
                    },
                    _ => Event::IntentFailed { message: String::new() },
                };
                prop_assert!(transition(&state, &test_context(), answer).is_ok());
            }
        }
    }

    /// Whitespace-only input is rejected in every state
    #[test]
    fn prop_empty_rejected(state in arb_state(), text in "[ \t\n]{0,5}") {
        let result = transition(&state, &test_context(), Event::UserMessage { text });
        prop_assert_eq!(result.unwrap_err(), TransitionError::EmptyMessage);
    }

    /// Messages during an in-flight turn are rejected
    #[test]
    fn prop_busy_rejects_input(
        text in arb_free_text(),
        stale in proptest::option::of(arb_confirmation()),
        input in "[a-z]{1,10}",
        chat in any::<bool>(),
    ) {
        let state = if chat {
            DialogueState::ChatRequesting { text, stale }
        } else {
            DialogueState::IntentRequesting { text, stale }
        };
        let result = transition(&state, &test_context(), Event::UserMessage { text: input });
        prop_assert_eq!(result.unwrap_err(), TransitionError::Busy);
    }

    /// Any casing of a yes answer fires accept exactly once and consults no oracle
    #[test]
    fn prop_yes_accepts_once(confirmation in arb_confirmation(), answer in yes_variant()) {
        let state = DialogueState::AwaitingConfirmation { confirmation };
        let result = transition(&state, &test_context(), Event::UserMessage { text: answer }).unwrap();

        prop_assert_eq!(count_replies(&result, ACCEPT_ACK), 1);
        prop_assert!(!result.effects.iter().any(Effect::is_oracle_request));
        let awaiting = matches!(result.new_state, DialogueState::AwaitingConfirmation { .. });
        prop_assert!(!awaiting);
        prop_assert!(!result.new_state.is_busy());
    }

    /// A no answer fires decline exactly once and consults no oracle
    #[test]
    fn prop_no_declines_once(
        confirmation in arb_confirmation(),
        answer in proptest::sample::select(NEGATIVE.to_vec()),
    ) {
        let state = DialogueState::AwaitingConfirmation { confirmation };
        let result = transition(&state, &test_context(), Event::UserMessage { text: answer.to_string() }).unwrap();

        prop_assert_eq!(count_replies(&result, DECLINE_ACK), 1);
        prop_assert!(!result.effects.iter().any(Effect::is_oracle_request));
        prop_assert_eq!(result.new_state, DialogueState::Idle);
    }

    /// Any template text is captured as-is and returns to Idle
    #[test]
    fn prop_template_captured(template in arb_template(), text in "[A-Za-z0-9][A-Za-z0-9:,.\\n ]{0,60}[A-Za-z0-9.]") {
        let expected_nav = template.redirect.is_some();
        let state = DialogueState::AwaitingTemplate { template };
        let result = transition(&state, &test_context(), Event::UserMessage { text: text.clone() }).unwrap();

        prop_assert_eq!(result.new_state, DialogueState::Idle);
        let stored = result.effects.contains(&Effect::StoreHandoff { value: text });
        prop_assert!(stored);
        prop_assert!(!result.effects.iter().any(Effect::is_oracle_request));
        let navs = result.effects.iter().filter(|e| matches!(e, Effect::Navigate { .. })).count();
        prop_assert_eq!(navs, usize::from(expected_nav));
    }

    /// A chat failure never records history and apologises exactly once
    #[test]
    fn prop_chat_failure_leaves_history(
        text in arb_free_text(),
        stale in proptest::option::of(arb_confirmation()),
        kind in arb_error_kind(),
    ) {
        let state = DialogueState::ChatRequesting { text, stale: stale.clone() };
        let result = transition(&state, &test_context(), Event::ChatFailed { kind, message: String::new() }).unwrap();

        let recorded = result.effects.iter().any(|e| matches!(e, Effect::RecordExchange { .. }));
        prop_assert!(!recorded);
        let replies = result.effects.iter().filter(|e| matches!(e, Effect::Reply { .. })).count();
        prop_assert_eq!(replies, 1);
        prop_assert_eq!(result.new_state, DialogueState::settle(stale));
    }

    /// OTHER never produces a proposal
    #[test]
    fn prop_other_intent_no_proposal(text in arb_free_text(), slots in arb_slots()) {
        let state = DialogueState::IntentRequesting { text, stale: None };
        let result = transition(&state, &test_context(), Event::IntentParsed { intent: Intent::Other, slots }).unwrap();

        prop_assert_eq!(result.new_state, DialogueState::Idle);
        let replied = result.effects.iter().any(|e| matches!(e, Effect::Reply { .. }));
        prop_assert!(!replied);
    }
}
