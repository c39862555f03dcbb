//! Edit history recording: field-level diffs and prior-state snapshots.
//!
//! Each successful edit persists two things: the list of fields that
//! actually changed (old/new value pairs) and a full snapshot of the
//! transaction as it was before the edit. The snapshot is stored even when
//! the diff is empty, so any historical version can be reconstructed by
//! walking snapshots newest-first.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::types::{ResolvedSplit, SplitState, TransactionPatch, TransactionState};

/// Classification of an edit-history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditType {
    /// The transaction was created; there is no prior state to diff.
    Create,
    /// One or more scalar fields changed.
    Update,
    /// The split set changed (possibly alongside scalar fields).
    SplitChange,
}

/// One changed field with its before and after values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    /// The field name.
    pub field: String,
    /// The value before the edit.
    pub old_value: Value,
    /// The value after the edit.
    pub new_value: Value,
}

impl FieldChange {
    fn new(field: &str, old_value: Value, new_value: Value) -> Self {
        Self {
            field: field.to_string(),
            old_value,
            new_value,
        }
    }
}

/// Computes the field-level diff a patch would apply to a transaction.
///
/// Only fields present in the patch are compared — an absent field means
/// "no change requested", while a present-but-null field is a real value
/// that compares against the stored one. Dates compare by instant. Splits
/// compare by length and then pairwise by (amount, category); any
/// difference yields a single `splits` entry carrying both full arrays.
///
/// `resolved_splits` must be supplied exactly when the patch carries
/// splits, with the categories already resolved.
#[must_use]
pub fn detect_changes(
    existing: &TransactionState,
    patch: &TransactionPatch,
    resolved_splits: Option<&[ResolvedSplit]>,
) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    if let Some(memo) = &patch.memo {
        if *memo != existing.memo {
            changes.push(FieldChange::new("memo", json!(existing.memo), json!(memo)));
        }
    }

    if let Some(amount) = patch.amount {
        if amount != existing.amount {
            changes.push(FieldChange::new(
                "amount",
                json!(existing.amount),
                json!(amount),
            ));
        }
    }

    if let Some(kind) = patch.kind {
        if kind != existing.kind {
            changes.push(FieldChange::new(
                "transaction_type",
                json!(existing.kind),
                json!(kind),
            ));
        }
    }

    if let Some(date) = patch.date {
        // Instant comparison; formatting differences are not a change.
        if date != existing.date {
            changes.push(FieldChange::new("date", json!(existing.date), json!(date)));
        }
    }

    if let Some(vendor_id) = &patch.vendor_id {
        if *vendor_id != existing.vendor_id {
            changes.push(FieldChange::new(
                "vendor_id",
                json!(existing.vendor_id),
                json!(vendor_id),
            ));
        }
    }

    if let Some(destination) = &patch.destination_account_id {
        if *destination != existing.destination_account_id {
            changes.push(FieldChange::new(
                "destination_account_id",
                json!(existing.destination_account_id),
                json!(destination),
            ));
        }
    }

    if let Some(new_splits) = resolved_splits {
        if splits_differ(&existing.splits, new_splits) {
            changes.push(FieldChange::new(
                "splits",
                splits_json(existing.splits.iter().map(|s| (s.amount, s.category_id))),
                splits_json(new_splits.iter().map(|s| (s.amount, s.category_id))),
            ));
        }
    }

    changes
}

/// Classifies a computed change set.
#[must_use]
pub fn classify(changes: &[FieldChange]) -> EditType {
    if changes.iter().any(|c| c.field == "splits") {
        EditType::SplitChange
    } else {
        EditType::Update
    }
}

fn splits_differ(existing: &[SplitState], new: &[ResolvedSplit]) -> bool {
    existing.len() != new.len()
        || existing
            .iter()
            .zip(new)
            .any(|(old, new)| old.amount != new.amount || old.category_id != new.category_id)
}

fn splits_json(
    splits: impl Iterator<Item = (rust_decimal::Decimal, cashbook_shared::types::CategoryId)>,
) -> Value {
    Value::Array(
        splits
            .map(|(amount, category_id)| {
                json!({ "amount": amount, "category_id": category_id })
            })
            .collect(),
    )
}

/// Builds the decimal-safe snapshot of a transaction before a mutation.
///
/// Monetary fields serialize through `Decimal` (never floating point),
/// instants as ISO timestamps, and splits as `{amount, category_id}` pairs.
#[must_use]
pub fn build_previous_state(state: &TransactionState) -> Value {
    json!({
        "id": state.id,
        "account_id": state.account_id,
        "destination_account_id": state.destination_account_id,
        "transaction_type": state.kind,
        "amount": state.amount,
        "fee_amount": state.fee_amount,
        "apply_fee": state.apply_fee,
        "date": state.date,
        "memo": state.memo,
        "vendor_id": state.vendor_id,
        "status": state.status,
        "cleared_at": state.cleared_at,
        "reconciled_at": state.reconciled_at,
        "version": state.version,
        "splits": state
            .splits
            .iter()
            .map(|s| json!({ "amount": s.amount, "category_id": s.category_id }))
            .collect::<Vec<_>>(),
    })
}
