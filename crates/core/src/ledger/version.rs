//! Optimistic version checking for concurrent transaction edits.
//!
//! Every transaction carries a monotonic `version` starting at 1. A caller
//! submits the version it last read; the stored version must match exactly
//! or the edit is rejected so the caller can re-read, merge, and retry. A
//! force save skips the comparison but still bumps the version.

use thiserror::Error;

/// Errors from the pure version check.
///
/// The storage layer maps [`VersionError::Stale`] to a full version-conflict
/// error after loading the editor metadata the conflict must carry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    /// Versions start at 1; zero or negative submissions are malformed.
    #[error("Version must be a positive integer, got {0}")]
    NotPositive(i64),

    /// The submitted version does not match the stored one.
    #[error("Submitted version {submitted} does not match stored version {current}")]
    Stale {
        /// The version currently stored.
        current: i64,
        /// The version the caller submitted.
        submitted: i64,
    },
}

/// Verifies a submitted version against the stored one.
///
/// Returns the next version to store on success. `force` skips the
/// comparison (but not the positivity check) and always succeeds.
///
/// # Errors
///
/// Returns [`VersionError::NotPositive`] for a submitted version below 1,
/// or [`VersionError::Stale`] on any mismatch — past and future values
/// alike.
pub fn verify_version(current: i64, submitted: i64, force: bool) -> Result<i64, VersionError> {
    if submitted < 1 {
        return Err(VersionError::NotPositive(submitted));
    }

    if !force && submitted != current {
        return Err(VersionError::Stale { current, submitted });
    }

    Ok(next_version(current))
}

/// Returns the version to store after a successful edit.
#[must_use]
pub const fn next_version(current: i64) -> i64 {
    current + 1
}
