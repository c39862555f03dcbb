//! Status state machine for the clearing/reconciliation lifecycle.
//!
//! Transactions move `uncleared <-> cleared -> reconciled`. Reconciled is
//! terminal: no transition leaves it, and reconciled transactions reject
//! every edit elsewhere in the engine. Same-state transitions are rejected
//! rather than treated as no-ops so callers learn their view is stale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cashbook_shared::types::TransactionId;

use super::error::LedgerError;
use super::types::TransactionStatus;

/// Validates a status transition.
///
/// Allowed: `uncleared -> cleared`, `cleared -> uncleared`,
/// `cleared -> reconciled`. Everything else — shortcuts, reversals out of
/// reconciled, and `X -> X` — is rejected.
///
/// # Errors
///
/// Returns [`LedgerError::InvalidTransition`] naming both states.
pub fn validate_transition(
    from: TransactionStatus,
    to: TransactionStatus,
) -> Result<(), LedgerError> {
    use TransactionStatus::{Cleared, Reconciled, Uncleared};

    match (from, to) {
        (Uncleared, Cleared) | (Cleared, Uncleared) | (Cleared, Reconciled) => Ok(()),
        _ => Err(LedgerError::InvalidTransition { from, to }),
    }
}

/// The lifecycle timestamps a transaction carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusTimestamps {
    /// When the transaction entered the cleared state.
    pub cleared_at: Option<DateTime<Utc>>,
    /// When the transaction was reconciled.
    pub reconciled_at: Option<DateTime<Utc>>,
}

/// Computes the timestamps after a (validated) transition.
///
/// Entering cleared stamps `cleared_at` once and keeps the original stamp
/// on re-entry. Entering reconciled stamps `reconciled_at` and backfills
/// `cleared_at` if it was never set. Reverting to uncleared clears both.
#[must_use]
pub fn transition_timestamps(
    to: TransactionStatus,
    now: DateTime<Utc>,
    current: StatusTimestamps,
) -> StatusTimestamps {
    match to {
        TransactionStatus::Uncleared => StatusTimestamps::default(),
        TransactionStatus::Cleared => StatusTimestamps {
            cleared_at: current.cleared_at.or(Some(now)),
            reconciled_at: None,
        },
        TransactionStatus::Reconciled => StatusTimestamps {
            cleared_at: current.cleared_at.or(Some(now)),
            reconciled_at: Some(now),
        },
    }
}

/// One failed item of a bulk status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkStatusFailure {
    /// The transaction that could not be transitioned.
    pub transaction_id: TransactionId,
    /// Human-readable reason, suitable for display.
    pub reason: String,
}

/// Result of a bulk status change.
///
/// Items are processed independently; failures are collected so the caller
/// can retry just those.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkStatusOutcome {
    /// Transactions that reached the target status.
    pub successful: Vec<TransactionId>,
    /// Transactions that did not, with reasons.
    pub failed: Vec<BulkStatusFailure>,
}

impl BulkStatusOutcome {
    /// Records a successful transition.
    pub fn record_success(&mut self, transaction_id: TransactionId) {
        self.successful.push(transaction_id);
    }

    /// Records a failed transition with its reason.
    pub fn record_failure(&mut self, transaction_id: TransactionId, reason: impl Into<String>) {
        self.failed.push(BulkStatusFailure {
            transaction_id,
            reason: reason.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use TransactionStatus::{Cleared, Reconciled, Uncleared};

    #[rstest]
    #[case(Uncleared, Cleared)]
    #[case(Cleared, Uncleared)]
    #[case(Cleared, Reconciled)]
    fn test_allowed_transitions(#[case] from: TransactionStatus, #[case] to: TransactionStatus) {
        assert!(validate_transition(from, to).is_ok());
    }

    #[rstest]
    #[case(Uncleared, Reconciled)] // no shortcut past cleared
    #[case(Reconciled, Cleared)]
    #[case(Reconciled, Uncleared)]
    #[case(Uncleared, Uncleared)]
    #[case(Cleared, Cleared)]
    #[case(Reconciled, Reconciled)]
    fn test_rejected_transitions(#[case] from: TransactionStatus, #[case] to: TransactionStatus) {
        let result = validate_transition(from, to);
        assert!(matches!(
            result,
            Err(LedgerError::InvalidTransition { from: f, to: t }) if f == from && t == to
        ));
    }

    #[test]
    fn test_clearing_stamps_once() {
        let now = Utc::now();
        let stamped = transition_timestamps(Cleared, now, StatusTimestamps::default());
        assert_eq!(stamped.cleared_at, Some(now));
        assert_eq!(stamped.reconciled_at, None);

        // Re-entering cleared later keeps the original stamp.
        let later = now + chrono::Duration::hours(1);
        let restamped = transition_timestamps(Cleared, later, stamped);
        assert_eq!(restamped.cleared_at, Some(now));
    }

    #[test]
    fn test_reconciling_backfills_cleared_at() {
        let now = Utc::now();
        let stamped = transition_timestamps(Reconciled, now, StatusTimestamps::default());
        assert_eq!(stamped.cleared_at, Some(now));
        assert_eq!(stamped.reconciled_at, Some(now));
    }

    #[test]
    fn test_reconciling_keeps_existing_cleared_at() {
        let cleared = Utc::now();
        let reconciled = cleared + chrono::Duration::days(3);
        let current = StatusTimestamps {
            cleared_at: Some(cleared),
            reconciled_at: None,
        };
        let stamped = transition_timestamps(Reconciled, reconciled, current);
        assert_eq!(stamped.cleared_at, Some(cleared));
        assert_eq!(stamped.reconciled_at, Some(reconciled));
    }

    #[test]
    fn test_unclearing_drops_timestamps() {
        let now = Utc::now();
        let current = StatusTimestamps {
            cleared_at: Some(now),
            reconciled_at: None,
        };
        let stamped = transition_timestamps(Uncleared, now, current);
        assert_eq!(stamped, StatusTimestamps::default());
    }

    #[test]
    fn test_bulk_outcome_collects_both() {
        let mut outcome = BulkStatusOutcome::default();
        let ok_id = TransactionId::new();
        let bad_id = TransactionId::new();

        outcome.record_success(ok_id);
        outcome.record_failure(bad_id, "transaction is already cleared");

        assert_eq!(outcome.successful, vec![ok_id]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].transaction_id, bad_id);
        assert_eq!(outcome.failed[0].reason, "transaction is already cleared");
    }
}
