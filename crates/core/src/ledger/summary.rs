//! Reconciliation summaries: transaction counts and totals per status.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cashbook_shared::types::AccountId;

use super::types::TransactionStatus;

/// Count and amount total for one status group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBucket {
    /// Number of transactions in the group.
    pub count: u64,
    /// Sum of transaction amount magnitudes (not balance-signed).
    pub total: Decimal,
}

impl StatusBucket {
    fn add(&mut self, amount: Decimal) {
        self.count += 1;
        self.total += amount;
    }
}

/// Per-account reconciliation summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    /// The account summarized.
    pub account_id: AccountId,
    /// The account's display name.
    pub account_name: String,
    /// Transactions not yet seen on a statement.
    pub uncleared: StatusBucket,
    /// Transactions matched against a statement.
    pub cleared: StatusBucket,
    /// Transactions locked in by reconciliation.
    pub reconciled: StatusBucket,
    /// All transactions; equals the sum of the three groups.
    pub overall: StatusBucket,
}

/// Folds `(status, amount)` rows into a reconciliation summary.
///
/// Read-only: amounts are summed as magnitudes, exactly as stored.
#[must_use]
pub fn summarize(
    account_id: AccountId,
    account_name: String,
    rows: impl IntoIterator<Item = (TransactionStatus, Decimal)>,
) -> ReconciliationSummary {
    let mut uncleared = StatusBucket::default();
    let mut cleared = StatusBucket::default();
    let mut reconciled = StatusBucket::default();
    let mut overall = StatusBucket::default();

    for (status, amount) in rows {
        match status {
            TransactionStatus::Uncleared => uncleared.add(amount),
            TransactionStatus::Cleared => cleared.add(amount),
            TransactionStatus::Reconciled => reconciled.add(amount),
        }
        overall.add(amount);
    }

    ReconciliationSummary {
        account_id,
        account_name,
        uncleared,
        cleared,
        reconciled,
        overall,
    }
}
