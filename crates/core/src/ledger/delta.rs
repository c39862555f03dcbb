//! Balance mutation engine.
//!
//! Computes the signed balance deltas a transaction applies to its source
//! (and, for transfers, destination) account. Every mutation path in the
//! system goes through [`TransactionEffect`]: creation applies an effect,
//! deletion applies its exact negation, and an edit applies the negation of
//! the previous state's effect followed by the new state's effect.

use rust_decimal::Decimal;

use cashbook_shared::types::AccountId;

use super::error::LedgerError;
use super::types::{TransactionKind, TransactionState};

/// Resolves the fee a transaction applies to its source account.
///
/// The explicit caller fee wins over the account's configured default;
/// no fee applies at all unless `apply_fee` is set.
#[must_use]
pub fn resolve_fee(explicit: Option<Decimal>, account_default: Decimal, apply_fee: bool) -> Decimal {
    if apply_fee {
        explicit.unwrap_or(account_default)
    } else {
        Decimal::ZERO
    }
}

/// The signed balance deltas one transaction applies to its accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEffect {
    /// The source account.
    pub source_account_id: AccountId,
    /// Signed delta applied to the source balance.
    pub source_delta: Decimal,
    /// Destination account and its signed delta (transfers only).
    pub destination: Option<(AccountId, Decimal)>,
}

impl TransactionEffect {
    /// Computes the effect of a transaction.
    ///
    /// `amount` and `fee` are non-negative magnitudes; `fee` is the fee
    /// actually applied (zero when fees are off — see [`resolve_fee`]).
    ///
    /// | kind     | source delta      | destination delta |
    /// |----------|-------------------|-------------------|
    /// | income   | `+amount - fee`   | none              |
    /// | expense  | `-amount - fee`   | none              |
    /// | transfer | `-amount - fee`   | `+amount`         |
    ///
    /// The fee never reaches the destination account.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a negative amount or fee, a transfer
    /// without a destination or targeting its own source, or a non-transfer
    /// carrying a destination.
    pub fn compute(
        kind: TransactionKind,
        source_account_id: AccountId,
        destination_account_id: Option<AccountId>,
        amount: Decimal,
        fee: Decimal,
    ) -> Result<Self, LedgerError> {
        if amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount);
        }
        if fee < Decimal::ZERO {
            return Err(LedgerError::NegativeFee);
        }

        match kind {
            TransactionKind::Income => {
                if destination_account_id.is_some() {
                    return Err(LedgerError::DestinationNotAllowed);
                }
                Ok(Self {
                    source_account_id,
                    source_delta: amount - fee,
                    destination: None,
                })
            }
            TransactionKind::Expense => {
                if destination_account_id.is_some() {
                    return Err(LedgerError::DestinationNotAllowed);
                }
                Ok(Self {
                    source_account_id,
                    source_delta: -amount - fee,
                    destination: None,
                })
            }
            TransactionKind::Transfer => {
                let destination_id = destination_account_id
                    .ok_or(LedgerError::TransferMissingDestination)?;
                if destination_id == source_account_id {
                    return Err(LedgerError::TransferSameAccount);
                }
                Ok(Self {
                    source_account_id,
                    source_delta: -amount - fee,
                    destination: Some((destination_id, amount)),
                })
            }
        }
    }

    /// Computes the effect a persisted transaction applied when written.
    ///
    /// Uses the fee persisted on the row, never the account's current fee
    /// configuration, so reversal is exact even if the account default
    /// changed since.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the persisted state is malformed.
    pub fn of_state(state: &TransactionState) -> Result<Self, LedgerError> {
        Self::compute(
            state.kind,
            state.account_id,
            state.destination_account_id,
            state.amount,
            state.effective_fee(),
        )
    }

    /// Returns the exact negation of this effect.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            source_account_id: self.source_account_id,
            source_delta: -self.source_delta,
            destination: self.destination.map(|(id, delta)| (id, -delta)),
        }
    }

    /// Returns the per-account deltas of this effect, source first.
    #[must_use]
    pub fn account_deltas(&self) -> Vec<(AccountId, Decimal)> {
        let mut deltas = vec![(self.source_account_id, self.source_delta)];
        if let Some((id, delta)) = self.destination {
            deltas.push((id, delta));
        }
        deltas
    }
}

/// Folds a sequence of effects into net per-account deltas.
///
/// An account touched by several effects (e.g. the old and new state of an
/// edit, or a destination that becomes the source) nets to a single delta,
/// so the storage layer updates each balance exactly once. Ordering follows
/// first appearance, which keeps the result deterministic.
#[must_use]
pub fn fold_deltas(effects: &[TransactionEffect]) -> Vec<(AccountId, Decimal)> {
    let mut folded: Vec<(AccountId, Decimal)> = Vec::new();

    for effect in effects {
        for (account_id, delta) in effect.account_deltas() {
            match folded.iter_mut().find(|(id, _)| *id == account_id) {
                Some((_, existing)) => *existing += delta,
                None => folded.push((account_id, delta)),
            }
        }
    }

    folded
}
