//! Transaction ledger engine.
//!
//! This module implements the core ledger functionality:
//! - Signed balance deltas for income/expense/transfer transactions
//! - Optimistic version checking for concurrent edits
//! - The uncleared/cleared/reconciled status lifecycle
//! - Field-level edit auditing with full prior-state snapshots
//! - Reconciliation summaries grouped by status

pub mod delta;
pub mod error;
pub mod history;
pub mod status;
pub mod summary;
pub mod types;
pub mod version;

#[cfg(test)]
mod delta_props;
#[cfg(test)]
mod status_props;

pub use delta::{fold_deltas, resolve_fee, TransactionEffect};
pub use error::{LedgerError, VersionConflict};
pub use history::{build_previous_state, classify, detect_changes, EditType, FieldChange};
pub use status::{
    transition_timestamps, validate_transition, BulkStatusFailure, BulkStatusOutcome,
    StatusTimestamps,
};
pub use summary::{summarize, ReconciliationSummary, StatusBucket};
pub use types::{
    CategoryRef, CreateTransactionInput, ResolvedSplit, SplitRequest, SplitState,
    TransactionKind, TransactionPatch, TransactionState, TransactionStatus,
};
pub use version::{next_version, verify_version, VersionError};
