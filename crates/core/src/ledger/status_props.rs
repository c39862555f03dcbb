//! Property tests for the status state machine.

use proptest::prelude::*;

use super::status::{transition_timestamps, validate_transition, StatusTimestamps};
use super::types::TransactionStatus;

/// Strategy for generating statuses.
fn status_strategy() -> impl Strategy<Value = TransactionStatus> {
    prop_oneof![
        Just(TransactionStatus::Uncleared),
        Just(TransactionStatus::Cleared),
        Just(TransactionStatus::Reconciled),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Same-state transitions are always rejected.
    #[test]
    fn prop_no_op_transitions_rejected(status in status_strategy()) {
        prop_assert!(validate_transition(status, status).is_err());
    }

    /// Reconciled is terminal: no transition leaves it.
    #[test]
    fn prop_reconciled_is_terminal(to in status_strategy()) {
        prop_assert!(validate_transition(TransactionStatus::Reconciled, to).is_err());
    }

    /// Reconciled is only reachable from cleared.
    #[test]
    fn prop_reconciled_only_from_cleared(from in status_strategy()) {
        let result = validate_transition(from, TransactionStatus::Reconciled);
        if from == TransactionStatus::Cleared {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(result.is_err());
        }
    }

    /// The transition table admits exactly three edges.
    #[test]
    fn prop_exactly_three_edges(from in status_strategy(), to in status_strategy()) {
        use TransactionStatus::{Cleared, Reconciled, Uncleared};
        let allowed = matches!(
            (from, to),
            (Uncleared, Cleared) | (Cleared, Uncleared) | (Cleared, Reconciled)
        );
        prop_assert_eq!(validate_transition(from, to).is_ok(), allowed);
    }

    /// Every allowed transition produces timestamps consistent with the
    /// target state: uncleared carries none, cleared carries only
    /// cleared_at, reconciled carries both.
    #[test]
    fn prop_timestamps_match_target_state(
        to in status_strategy(),
        had_cleared in any::<bool>(),
    ) {
        let now = chrono::Utc::now();
        let current = StatusTimestamps {
            cleared_at: had_cleared.then_some(now - chrono::Duration::days(1)),
            reconciled_at: None,
        };
        let stamped = transition_timestamps(to, now, current);

        match to {
            TransactionStatus::Uncleared => {
                prop_assert!(stamped.cleared_at.is_none());
                prop_assert!(stamped.reconciled_at.is_none());
            }
            TransactionStatus::Cleared => {
                prop_assert!(stamped.cleared_at.is_some());
                prop_assert!(stamped.reconciled_at.is_none());
            }
            TransactionStatus::Reconciled => {
                prop_assert!(stamped.cleared_at.is_some());
                prop_assert_eq!(stamped.reconciled_at, Some(now));
            }
        }
    }

    /// An existing cleared_at stamp survives any forward transition.
    #[test]
    fn prop_cleared_at_is_stable(to in status_strategy()) {
        prop_assume!(to != TransactionStatus::Uncleared);

        let first_cleared = chrono::Utc::now() - chrono::Duration::days(7);
        let current = StatusTimestamps {
            cleared_at: Some(first_cleared),
            reconciled_at: None,
        };
        let stamped = transition_timestamps(to, chrono::Utc::now(), current);
        prop_assert_eq!(stamped.cleared_at, Some(first_cleared));
    }
}
