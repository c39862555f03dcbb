//! Ledger domain types for transaction creation and editing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cashbook_shared::types::{
    AccountId, CategoryId, SplitId, TransactionId, UserId, VendorId,
};

/// Transaction kind classification.
///
/// Determines the sign of the balance delta applied to the source account
/// and whether a destination account participates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money entering the source account.
    Income,
    /// Money leaving the source account.
    Expense,
    /// Money moving from the source account to a destination account.
    Transfer,
}

impl TransactionKind {
    /// Returns true if this kind requires a destination account.
    #[must_use]
    pub fn requires_destination(self) -> bool {
        matches!(self, Self::Transfer)
    }
}

impl Default for TransactionKind {
    fn default() -> Self {
        Self::Expense
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Expense => write!(f, "expense"),
            Self::Transfer => write!(f, "transfer"),
        }
    }
}

/// Transaction status in the clearing/reconciliation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Recorded but not yet seen on a bank statement.
    Uncleared,
    /// Matched against a bank statement line.
    Cleared,
    /// Locked in by a completed reconciliation (immutable).
    Reconciled,
}

impl TransactionStatus {
    /// Returns true if the transaction can still be edited.
    #[must_use]
    pub fn is_editable(self) -> bool {
        !self.is_immutable()
    }

    /// Returns true if the transaction is immutable.
    #[must_use]
    pub fn is_immutable(self) -> bool {
        matches!(self, Self::Reconciled)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uncleared => write!(f, "uncleared"),
            Self::Cleared => write!(f, "cleared"),
            Self::Reconciled => write!(f, "reconciled"),
        }
    }
}

/// Reference to a spending category, by id or by name.
///
/// Category resolution is delegated to the category subsystem; the ledger
/// engine only hands references over and receives stable ids back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryRef {
    /// A known category id.
    Id(CategoryId),
    /// A category name to be resolved within the organization.
    Name(String),
}

/// A split as submitted by the caller, category not yet resolved.
#[derive(Debug, Clone)]
pub struct SplitRequest {
    /// The category this portion of the amount is attributed to.
    pub category: CategoryRef,
    /// The portion of the transaction amount.
    pub amount: Decimal,
    /// Optional memo for this split.
    pub memo: Option<String>,
}

/// A split with its category resolved to a stable id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSplit {
    /// The resolved category id.
    pub category_id: CategoryId,
    /// The portion of the transaction amount.
    pub amount: Decimal,
    /// Optional memo for this split.
    pub memo: Option<String>,
}

/// A persisted split belonging to a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitState {
    /// Unique identifier for this split.
    pub id: SplitId,
    /// The resolved category id.
    pub category_id: CategoryId,
    /// The portion of the transaction amount.
    pub amount: Decimal,
    /// Optional memo for this split.
    pub memo: Option<String>,
}

impl SplitState {
    /// Projects this split down to its comparable payload.
    #[must_use]
    pub fn to_resolved(&self) -> ResolvedSplit {
        ResolvedSplit {
            category_id: self.category_id,
            amount: self.amount,
            memo: self.memo.clone(),
        }
    }
}

/// Full state of a persisted transaction as the engine sees it.
///
/// Repositories build this from storage rows before invoking the pure
/// engine functions (delta computation, diffing, snapshotting).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionState {
    /// Unique identifier.
    pub id: TransactionId,
    /// The source account.
    pub account_id: AccountId,
    /// The destination account (transfers only).
    pub destination_account_id: Option<AccountId>,
    /// Transaction kind.
    pub kind: TransactionKind,
    /// Unsigned amount magnitude.
    pub amount: Decimal,
    /// The fee resolved at write time, if any.
    pub fee_amount: Option<Decimal>,
    /// Whether the fee participates in the balance delta.
    pub apply_fee: bool,
    /// When the transaction occurred.
    pub date: DateTime<Utc>,
    /// Free-form memo.
    pub memo: Option<String>,
    /// Optional vendor reference (opaque to the engine).
    pub vendor_id: Option<VendorId>,
    /// Lifecycle status.
    pub status: TransactionStatus,
    /// When the transaction entered the cleared state.
    pub cleared_at: Option<DateTime<Utc>>,
    /// When the transaction was reconciled.
    pub reconciled_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency version, starts at 1.
    pub version: i64,
    /// User who created the transaction.
    pub created_by: UserId,
    /// User who last edited the transaction.
    pub last_modified_by: Option<UserId>,
    /// The transaction's splits.
    pub splits: Vec<SplitState>,
}

impl TransactionState {
    /// Returns the fee this transaction actually applied to its source
    /// account: zero unless `apply_fee` is set.
    #[must_use]
    pub fn effective_fee(&self) -> Decimal {
        if self.apply_fee {
            self.fee_amount.unwrap_or(Decimal::ZERO)
        } else {
            Decimal::ZERO
        }
    }
}

/// Input for creating a new transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    /// The source account.
    pub account_id: AccountId,
    /// Transaction kind.
    pub kind: TransactionKind,
    /// Unsigned amount magnitude.
    pub amount: Decimal,
    /// Explicit fee override; defaults to the source account's configured fee.
    pub fee: Option<Decimal>,
    /// Whether to apply the fee to the source balance.
    pub apply_fee: bool,
    /// The destination account (transfers only).
    pub destination_account_id: Option<AccountId>,
    /// Optional vendor reference.
    pub vendor_id: Option<VendorId>,
    /// When the transaction occurred.
    pub date: DateTime<Utc>,
    /// Free-form memo.
    pub memo: Option<String>,
    /// Category splits (categories resolved by the repository).
    pub splits: Vec<SplitRequest>,
    /// User creating the transaction.
    pub created_by: UserId,
}

/// A partial update to a transaction.
///
/// Every field distinguishes "not present in the patch" (`None`) from
/// "present" (`Some(..)`); nullable fields additionally distinguish
/// "present and cleared" (`Some(None)`) from "present with a value"
/// (`Some(Some(..))`). A field absent from the patch is left untouched
/// and excluded from change detection.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    /// New amount magnitude.
    pub amount: Option<Decimal>,
    /// New transaction kind.
    pub kind: Option<TransactionKind>,
    /// New transaction date.
    pub date: Option<DateTime<Utc>>,
    /// New memo (`Some(None)` clears it).
    pub memo: Option<Option<String>>,
    /// New vendor reference (`Some(None)` clears it).
    pub vendor_id: Option<Option<VendorId>>,
    /// New destination account (`Some(None)` clears it).
    pub destination_account_id: Option<Option<AccountId>>,
    /// New explicit fee (`Some(None)` reverts to the account default).
    pub fee: Option<Option<Decimal>>,
    /// New fee-application flag.
    pub apply_fee: Option<bool>,
    /// Replacement splits (categories resolved by the repository).
    pub splits: Option<Vec<SplitRequest>>,
}

impl TransactionPatch {
    /// Returns true if the patch carries no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.kind.is_none()
            && self.date.is_none()
            && self.memo.is_none()
            && self.vendor_id.is_none()
            && self.destination_account_id.is_none()
            && self.fee.is_none()
            && self.apply_fee.is_none()
            && self.splits.is_none()
    }
}
