//! Ledger error types for validation, concurrency, and state errors.

use chrono::{DateTime, Utc};
use thiserror::Error;

use cashbook_shared::types::{AccountId, TransactionId, UserId};

use super::types::{TransactionState, TransactionStatus};

/// Metadata carried by a version conflict so the caller can render a diff
/// and offer a retry or force save.
#[derive(Debug, Clone)]
pub struct VersionConflict {
    /// The version currently stored.
    pub current_version: i64,
    /// The version the caller submitted.
    pub submitted_version: i64,
    /// Who last edited the transaction.
    pub last_modified_by: Option<UserId>,
    /// Display name of the last editor, when known.
    pub last_modified_by_name: Option<String>,
    /// Email of the last editor, when known.
    pub last_modified_by_email: Option<String>,
    /// When the transaction was last edited.
    pub last_modified_at: Option<DateTime<Utc>>,
    /// The full current transaction state.
    pub current_state: TransactionState,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Transfers must name a destination account.
    #[error("Transfer requires a destination account")]
    TransferMissingDestination,

    /// A transfer cannot target its own source account.
    #[error("Transfer destination must differ from the source account")]
    TransferSameAccount,

    /// Only transfers may carry a destination account.
    #[error("Only transfers may set a destination account")]
    DestinationNotAllowed,

    /// Amounts are unsigned magnitudes.
    #[error("Amount must not be negative")]
    NegativeAmount,

    /// Fees are unsigned magnitudes.
    #[error("Fee must not be negative")]
    NegativeFee,

    /// Submitted versions start at 1.
    #[error("Version must be a positive integer, got {0}")]
    InvalidVersion(i64),

    // ========== Not Found Errors ==========
    /// Account not found in the organization.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Destination account not found in the organization.
    #[error("Destination account not found: {0}")]
    DestinationAccountNotFound(AccountId),

    /// Transaction not found in the organization.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// Category could not be resolved within the organization.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    // ========== Concurrency Errors ==========
    /// Another edit landed first; carries the data needed for resolution.
    #[error("Version conflict: submitted {}, stored version is {}", .0.submitted_version, .0.current_version)]
    VersionConflict(Box<VersionConflict>),

    // ========== State Errors ==========
    /// The status state machine does not allow this transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: TransactionStatus,
        /// The requested status.
        to: TransactionStatus,
    },

    /// Reconciled transactions cannot be modified.
    #[error("Cannot modify reconciled transaction {0}")]
    ReconciledImmutable(TransactionId),

    // ========== Authorization (pass-through) ==========
    /// Surfaced from the membership collaborator, never raised here.
    #[error("Access denied: {0}")]
    Forbidden(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TransferMissingDestination => "TRANSFER_MISSING_DESTINATION",
            Self::TransferSameAccount => "TRANSFER_SAME_ACCOUNT",
            Self::DestinationNotAllowed => "DESTINATION_NOT_ALLOWED",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::NegativeFee => "NEGATIVE_FEE",
            Self::InvalidVersion(_) => "INVALID_VERSION",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::DestinationAccountNotFound(_) => "DESTINATION_ACCOUNT_NOT_FOUND",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::CategoryNotFound(_) => "CATEGORY_NOT_FOUND",
            Self::VersionConflict(_) => "VERSION_CONFLICT",
            Self::InvalidTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::ReconciledImmutable(_) => "RECONCILED_IMMUTABLE",
            Self::Forbidden(_) => "FORBIDDEN",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation and state-machine errors
            Self::TransferMissingDestination
            | Self::TransferSameAccount
            | Self::DestinationNotAllowed
            | Self::NegativeAmount
            | Self::NegativeFee
            | Self::InvalidVersion(_)
            | Self::InvalidTransition { .. } => 400,

            // 403 Forbidden
            Self::Forbidden(_) => 403,

            // 404 Not Found
            Self::AccountNotFound(_)
            | Self::DestinationAccountNotFound(_)
            | Self::TransactionNotFound(_)
            | Self::CategoryNotFound(_) => 404,

            // 409 Conflict
            Self::VersionConflict(_) | Self::ReconciledImmutable(_) => 409,
        }
    }

    /// Returns true if this error is expected and recoverable by the caller
    /// (retry with a fresh version, or elect a force save).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::VersionConflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashbook_shared::types::AccountId;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::TransferMissingDestination.error_code(),
            "TRANSFER_MISSING_DESTINATION"
        );
        assert_eq!(
            LedgerError::AccountNotFound(AccountId::new()).error_code(),
            "ACCOUNT_NOT_FOUND"
        );
        assert_eq!(
            LedgerError::InvalidTransition {
                from: TransactionStatus::Uncleared,
                to: TransactionStatus::Reconciled,
            }
            .error_code(),
            "INVALID_STATUS_TRANSITION"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::NegativeAmount.http_status_code(), 400);
        assert_eq!(
            LedgerError::Forbidden("not a member".into()).http_status_code(),
            403
        );
        assert_eq!(
            LedgerError::TransactionNotFound(TransactionId::new()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::ReconciledImmutable(TransactionId::new()).http_status_code(),
            409
        );
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = LedgerError::InvalidTransition {
            from: TransactionStatus::Reconciled,
            to: TransactionStatus::Cleared,
        };
        assert_eq!(
            err.to_string(),
            "Invalid status transition from reconciled to cleared"
        );
    }

    #[test]
    fn test_only_version_conflict_is_retryable() {
        assert!(!LedgerError::NegativeAmount.is_retryable());
        assert!(!LedgerError::ReconciledImmutable(TransactionId::new()).is_retryable());
    }
}
