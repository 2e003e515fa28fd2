//! Property-based tests for the dialogue state machine
//!
//! These tests verify key invariants hold across all states and inputs.

use super::replies;
use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_dialogue_state() -> impl Strategy<Value = DialogueState> {
    proptest::sample::select(DialogueState::ALL.to_vec())
}

fn arb_stored_state() -> impl Strategy<Value = StoredState> {
    prop_oneof![
        Just(StoredState::Fresh),
        arb_dialogue_state().prop_map(StoredState::Active),
        "[a-z_]{3,16}"
            .prop_filter("must not be a known label", |label| {
                DialogueState::from_label(label).is_none()
            })
            .prop_map(StoredState::Unknown),
    ]
}

fn arb_faq_key() -> impl Strategy<Value = String> {
    proptest::sample::select(replies::faq_keys().collect::<Vec<_>>())
        .prop_map(String::from)
}

/// Free text plus the inputs the table actually branches on
fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 @.]{0,24}",
        "[1-7]",
        Just("hola".to_string()),
        Just("ok".to_string()),
        Just("gracias".to_string()),
        Just("salir".to_string()),
        arb_faq_key(),
    ]
}

fn arb_policy() -> impl Strategy<Value = RecordFaq> {
    prop_oneof![Just(RecordFaq::Skip), Just(RecordFaq::Record)]
}

fn is_short_circuit(input: &UserInput) -> bool {
    input.is_exit() || replies::faq_answer(input.as_str()).is_some()
}

fn count_replies(result: &TransitionResult) -> usize {
    result
        .effects
        .iter()
        .filter(|effect| matches!(effect, Effect::SendReply { .. }))
        .count()
}

fn count_records(result: &TransitionResult) -> usize {
    result
        .effects
        .iter()
        .filter(|effect| matches!(effect, Effect::Record { .. }))
        .count()
}

// ============================================================================
// Invariants
// ============================================================================

proptest! {
    #[test]
    fn every_message_gets_one_reply_and_at_most_one_record(
        state in arb_stored_state(),
        text in arb_text(),
        record_faq in arb_policy(),
    ) {
        let context = DialogueContext { record_faq };
        let result = transition(&state, &context, &UserInput::new(&text));

        prop_assert_eq!(count_replies(&result), 1);
        prop_assert!(count_records(&result) <= 1);
    }

    #[test]
    fn transition_is_deterministic(state in arb_stored_state(), text in arb_text()) {
        let context = DialogueContext::default();
        let input = UserInput::new(&text);
        prop_assert_eq!(
            transition(&state, &context, &input),
            transition(&state, &context, &input)
        );
    }

    #[test]
    fn exit_always_ends_with_restart_message(state in arb_stored_state(), padding in " {0,3}") {
        let text = format!("{padding}SaLiR{padding}");
        let result = transition(&state, &DialogueContext::default(), &UserInput::new(&text));

        let restart = replies::restart();
        prop_assert_eq!(result.update, StateUpdate::End);
        prop_assert_eq!(result.reply_text(), Some(restart.as_str()));
    }

    #[test]
    fn faq_keys_never_change_state(state in arb_stored_state(), key in arb_faq_key()) {
        let context = DialogueContext::default();
        let first = transition(&state, &context, &UserInput::new(&key));
        let second = transition(&state, &context, &UserInput::new(&key));

        prop_assert_eq!(first.update, StateUpdate::Keep);
        prop_assert_eq!(count_records(&first), 0);
        prop_assert_eq!(first.reply_text(), second.reply_text());
    }

    #[test]
    fn fresh_senders_always_land_in_main_menu(text in arb_text()) {
        let input = UserInput::new(&text);
        prop_assume!(!is_short_circuit(&input));

        let result = transition(&StoredState::Fresh, &DialogueContext::default(), &input);
        prop_assert_eq!(result.update, StateUpdate::Enter(DialogueState::MainMenu));
        let welcome = replies::welcome();
        prop_assert_eq!(result.reply_text(), Some(welcome.as_str()));
    }

    #[test]
    fn email_state_closes_only_on_at_sign(text in arb_text()) {
        let input = UserInput::new(&text);
        prop_assume!(!is_short_circuit(&input));

        let result = transition(
            &StoredState::Active(DialogueState::AwaitingEmail),
            &DialogueContext::default(),
            &input,
        );
        if input.as_str().contains('@') {
            prop_assert_eq!(result.update, StateUpdate::End);
            prop_assert_eq!(result.recorded().map(|(_, label)| label), Some("Email Confirmado"));
        } else {
            prop_assert_eq!(result.update, StateUpdate::Keep);
        }
    }

    #[test]
    fn ending_a_conversation_records_a_terminal_label(
        state in arb_stored_state(),
        text in arb_text(),
    ) {
        let input = UserInput::new(&text);
        prop_assume!(!input.is_exit());

        let result = transition(&state, &DialogueContext::default(), &input);
        let terminal = result
            .recorded()
            .and_then(|(_, label)| TerminalOutcome::from_label(label))
            .is_some();
        prop_assert_eq!(result.update == StateUpdate::End, terminal);
    }

    #[test]
    fn recorded_label_matches_resulting_state(
        state in arb_stored_state(),
        text in arb_text(),
    ) {
        let input = UserInput::new(&text);
        prop_assume!(!is_short_circuit(&input));

        let result = transition(&state, &DialogueContext::default(), &input);
        let (_, label) = result.recorded().expect("non-FAQ branches always record");
        match result.update {
            StateUpdate::Enter(next) => prop_assert_eq!(label, next.label()),
            StateUpdate::Keep => prop_assert_eq!(label, state.label()),
            StateUpdate::End => prop_assert!(TerminalOutcome::from_label(label).is_some()),
        }
    }

    #[test]
    fn main_menu_option_one_is_never_terminal(padding in " {0,3}") {
        let text = format!("{padding}1{padding}");
        let result = transition(
            &StoredState::Active(DialogueState::MainMenu),
            &DialogueContext::default(),
            &UserInput::new(&text),
        );
        prop_assert_eq!(result.update, StateUpdate::Enter(DialogueState::AwaitingArea));
    }
}
