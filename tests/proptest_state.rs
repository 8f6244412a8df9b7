//! Property-based tests for the store and the bounded history log
//!
//! Run with: cargo test --test proptest_state

use enhanced_calc::state::{BoundedHistoryLog, HistoryOrder, NamedValueStore, OperationKind};
use proptest::prelude::*;
use std::collections::BTreeMap;

// ============================================================================
// STRATEGIES
// ============================================================================

/// Strategy for generating stored value names
fn arb_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,12}"
}

/// Strategy for generating finite operands
fn arb_operand() -> impl Strategy<Value = f64> {
    -1.0e6f64..1.0e6
}

/// Strategy for generating operation kinds
fn arb_operation() -> impl Strategy<Value = OperationKind> {
    prop_oneof![
        Just(OperationKind::Add),
        Just(OperationKind::Subtract),
        Just(OperationKind::Multiply),
        Just(OperationKind::Divide),
        Just(OperationKind::Power),
        "[a-z_]{3,12}"
            .prop_filter("reserved operation name", |name| {
                !matches!(
                    name.as_str(),
                    "add" | "subtract" | "multiply" | "divide" | "power"
                )
            })
            .prop_map(OperationKind::Other),
    ]
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_enumerate_is_sorted_and_last_write_wins(
        writes in prop::collection::vec((arb_name(), arb_operand()), 0..40)
    ) {
        let mut store = NamedValueStore::new();
        let mut model = BTreeMap::new();
        for (name, value) in &writes {
            store.set(name.clone(), *value);
            model.insert(name.clone(), *value);
        }

        let expected: Vec<(String, f64)> = model.into_iter().collect();
        prop_assert_eq!(store.size(), expected.len());
        prop_assert_eq!(store.enumerate(), expected);
    }

    #[test]
    fn prop_clear_returns_prior_size(
        names in prop::collection::hash_set(arb_name(), 0..20)
    ) {
        let mut store = NamedValueStore::new();
        for name in &names {
            store.set(name.clone(), 1.0);
        }

        prop_assert_eq!(store.clear(), names.len());
        prop_assert!(store.is_empty());
    }

    #[test]
    fn prop_history_never_exceeds_capacity(
        capacity in 1usize..20,
        calls in prop::collection::vec((arb_operation(), arb_operand(), arb_operand()), 0..60)
    ) {
        let mut log = BoundedHistoryLog::with_capacity(capacity);
        for (op, a, b) in &calls {
            log.record(op.clone(), *a, *b, a + b);
            prop_assert!(log.len() <= capacity);
        }
        prop_assert_eq!(log.len(), calls.len().min(capacity));
    }

    #[test]
    fn prop_history_keeps_most_recent_in_order(
        capacity in 1usize..15,
        count in 0usize..50
    ) {
        let mut log = BoundedHistoryLog::with_capacity(capacity);
        for i in 0..count {
            log.record(OperationKind::Add, i as f64, 0.0, i as f64);
        }

        let kept: Vec<f64> = log
            .list(HistoryOrder::InsertionOrder)
            .iter()
            .map(|r| r.a)
            .collect();
        let expected: Vec<f64> = (count.saturating_sub(capacity)..count)
            .map(|i| i as f64)
            .collect();
        prop_assert_eq!(&kept, &expected);

        let mut reversed: Vec<f64> = log
            .list(HistoryOrder::MostRecentFirst)
            .iter()
            .map(|r| r.a)
            .collect();
        reversed.reverse();
        prop_assert_eq!(reversed, kept);
    }

    #[test]
    fn prop_operation_kind_name_roundtrip(op in arb_operation()) {
        let parsed = OperationKind::from(op.name());
        prop_assert_eq!(parsed, op);
    }
}
