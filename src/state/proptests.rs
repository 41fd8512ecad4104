//! Property-based tests for the conversation store
//!
//! These tests check that derived state never drifts from the log.

use super::*;
use crate::models::{Aggregates, Message, Sender};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ]{1,40}",
        Just("Let's review your budget".to_string()),
        Just("Stocks and retirement go together".to_string()),
        Just("APR on the loan".to_string()),
        Just("Market trend report".to_string()),
        (1u32..1_000_000).prop_map(|n| format!("I earn ${}", n)),
        (1u32..1_000_000).prop_map(|n| format!("my net worth is {}.25", n)),
    ]
}

fn arb_message() -> impl Strategy<Value = Message> {
    (any::<bool>(), arb_text()).prop_map(|(is_user, text)| {
        if is_user {
            Message::user(text)
        } else {
            Message::bot(text)
        }
    })
}

#[derive(Debug, Clone)]
enum Op {
    Append(Message),
    SetLoading(bool),
    Reset,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => arb_message().prop_map(Op::Append),
        1 => any::<bool>().prop_map(Op::SetLoading),
        1 => Just(Op::Reset),
    ]
}

fn apply(store: &mut ConversationStore, op: Op) {
    match op {
        Op::Append(msg) => store.append(msg),
        Op::SetLoading(flag) => store.set_loading(flag),
        Op::Reset => store.reset(),
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn counts_always_sum_to_log_length(messages in prop::collection::vec(arb_message(), 0..40)) {
        let mut store = ConversationStore::new();
        for msg in messages {
            store.append(msg);
            let aggregates = store.aggregates();
            prop_assert_eq!(
                aggregates.user_message_count + aggregates.bot_message_count,
                store.current_log().len()
            );
        }
    }

    #[test]
    fn aggregates_match_full_recomputation(ops in prop::collection::vec(arb_op(), 0..50)) {
        let mut store = ConversationStore::new();
        for op in ops {
            apply(&mut store, op);
            prop_assert_eq!(store.aggregates(), &Aggregates::from_log(store.current_log()));
        }
    }

    #[test]
    fn at_most_one_topic_per_bot_message(messages in prop::collection::vec(arb_message(), 0..40)) {
        let mut store = ConversationStore::new();
        for msg in messages {
            store.append(msg);
        }
        let aggregates = store.aggregates();
        prop_assert!(aggregates.topic_counts.total() as usize <= aggregates.bot_message_count);
        prop_assert_eq!(aggregates.topic_counts.iter().count(), 5);
    }

    #[test]
    fn reset_always_yields_zero_state(ops in prop::collection::vec(arb_op(), 0..30)) {
        let mut store = ConversationStore::new();
        for op in ops {
            apply(&mut store, op);
        }
        store.reset();
        prop_assert!(store.current_log().is_empty());
        prop_assert_eq!(store.aggregates(), &Aggregates::default());
    }

    #[test]
    fn subscriber_sees_one_snapshot_per_mutation(ops in prop::collection::vec(arb_op(), 0..30)) {
        let mut store = ConversationStore::new();
        let mut sub = store.subscribe();
        let expected = ops.len() + 1;

        for op in ops {
            apply(&mut store, op);
        }

        let snapshots = sub.drain();
        prop_assert_eq!(snapshots.len(), expected);
        prop_assert_eq!(snapshots.last().map(|s| s.as_ref().clone()), Some(store.snapshot()));
    }

    #[test]
    fn figures_follow_last_matching_user_message(messages in prop::collection::vec(arb_message(), 1..30)) {
        let mut store = ConversationStore::new();
        for msg in messages.iter().cloned() {
            store.append(msg);
        }

        let expected_income = messages
            .iter()
            .filter(|m| m.sender == Sender::User)
            .filter_map(|m| crate::extractor::extract(&m.text).income)
            .last()
            .unwrap_or(0.0);
        prop_assert_eq!(store.aggregates().total_income, expected_income);
    }
}
