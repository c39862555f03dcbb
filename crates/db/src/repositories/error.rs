//! Repository error type.

use sea_orm::DbErr;
use thiserror::Error;

use cashbook_core::ledger::LedgerError;

/// Errors surfaced by the repositories.
///
/// Domain failures pass through [`LedgerError`] unchanged so callers can
/// branch on kind; storage failures wrap [`DbErr`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// A ledger domain error.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl StoreError {
    /// Returns the ledger error, if this is a domain failure.
    #[must_use]
    pub fn as_ledger(&self) -> Option<&LedgerError> {
        match self {
            Self::Ledger(err) => Some(err),
            Self::Database(_) => None,
        }
    }
}
