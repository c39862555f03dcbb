//! Property tests for the balance mutation engine.

use proptest::prelude::*;
use rust_decimal::Decimal;

use cashbook_shared::types::AccountId;

use super::delta::{fold_deltas, TransactionEffect};
use super::types::TransactionKind;

/// Strategy for generating non-negative amounts (two decimal places).
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for generating non-negative fees.
fn fee_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for generating transaction kinds.
fn kind_strategy() -> impl Strategy<Value = TransactionKind> {
    prop_oneof![
        Just(TransactionKind::Income),
        Just(TransactionKind::Expense),
        Just(TransactionKind::Transfer),
    ]
}

fn effect_for(kind: TransactionKind, amount: Decimal, fee: Decimal) -> TransactionEffect {
    let source = AccountId::new();
    let destination = kind.requires_destination().then(AccountId::new);
    TransactionEffect::compute(kind, source, destination, amount, fee).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Creating then deleting a transaction nets every touched account to
    /// zero, for every kind and any fee.
    #[test]
    fn prop_create_then_delete_nets_zero(
        kind in kind_strategy(),
        amount in amount_strategy(),
        fee in fee_strategy(),
    ) {
        let effect = effect_for(kind, amount, fee);
        let deltas = fold_deltas(&[effect.clone(), effect.reversed()]);

        for (account, delta) in deltas {
            prop_assert_eq!(delta, Decimal::ZERO, "account {} did not net to zero", account);
        }
    }

    /// Reversal negates every per-account delta exactly.
    #[test]
    fn prop_reversal_is_exact_negation(
        kind in kind_strategy(),
        amount in amount_strategy(),
        fee in fee_strategy(),
    ) {
        let effect = effect_for(kind, amount, fee);
        let reversed = effect.reversed();

        prop_assert_eq!(reversed.source_delta, -effect.source_delta);
        match (effect.destination, reversed.destination) {
            (None, None) => {}
            (Some((id, delta)), Some((rid, rdelta))) => {
                prop_assert_eq!(id, rid);
                prop_assert_eq!(rdelta, -delta);
            }
            _ => prop_assert!(false, "reversal changed the destination shape"),
        }
    }

    /// Double reversal restores the original effect.
    #[test]
    fn prop_double_reversal_is_identity(
        kind in kind_strategy(),
        amount in amount_strategy(),
        fee in fee_strategy(),
    ) {
        let effect = effect_for(kind, amount, fee);
        prop_assert_eq!(effect.reversed().reversed(), effect);
    }

    /// An edit (reverse old, apply new) leaves the source balance exactly
    /// at new_delta - old_delta, independent of the intermediate states.
    #[test]
    fn prop_edit_applies_net_difference(
        old_amount in amount_strategy(),
        new_amount in amount_strategy(),
        fee in fee_strategy(),
    ) {
        let account = AccountId::new();
        let old = TransactionEffect::compute(
            TransactionKind::Expense, account, None, old_amount, fee,
        ).unwrap();
        let new = TransactionEffect::compute(
            TransactionKind::Expense, account, None, new_amount, fee,
        ).unwrap();

        let deltas = fold_deltas(&[old.reversed(), new.clone()]);
        prop_assert_eq!(deltas.len(), 1);
        prop_assert_eq!(deltas[0].1, new.source_delta - old.source_delta);
    }

    /// Switching income to expense at the same amount and fee moves the
    /// source balance by exactly -2 * amount.
    #[test]
    fn prop_income_to_expense_doubles_down(
        amount in amount_strategy(),
        fee in fee_strategy(),
    ) {
        let account = AccountId::new();
        let income = TransactionEffect::compute(
            TransactionKind::Income, account, None, amount, fee,
        ).unwrap();
        let expense = TransactionEffect::compute(
            TransactionKind::Expense, account, None, amount, fee,
        ).unwrap();

        let deltas = fold_deltas(&[income.reversed(), expense]);
        prop_assert_eq!(deltas[0].1, Decimal::from(-2) * amount);
    }

    /// The transfer fee never reaches the destination account.
    #[test]
    fn prop_transfer_fee_stays_on_source(
        amount in amount_strategy(),
        fee in fee_strategy(),
    ) {
        let effect = effect_for(TransactionKind::Transfer, amount, fee);
        let (_, destination_delta) = effect.destination.unwrap();

        prop_assert_eq!(destination_delta, amount);
        prop_assert_eq!(effect.source_delta, -amount - fee);
    }

    /// Source and destination deltas of a fee-free transfer cancel; with a
    /// fee, the pair sums to exactly -fee.
    #[test]
    fn prop_transfer_conserves_minus_fee(
        amount in amount_strategy(),
        fee in fee_strategy(),
    ) {
        let effect = effect_for(TransactionKind::Transfer, amount, fee);
        let (_, destination_delta) = effect.destination.unwrap();
        prop_assert_eq!(effect.source_delta + destination_delta, -fee);
    }

    /// A chain of edits is equivalent to a single edit from the first state
    /// to the last: intermediate states cancel out.
    #[test]
    fn prop_chained_edits_telescope(
        amounts in prop::collection::vec(amount_strategy(), 2..8),
    ) {
        let account = AccountId::new();
        let effects: Vec<TransactionEffect> = amounts
            .iter()
            .map(|&amount| {
                TransactionEffect::compute(
                    TransactionKind::Expense, account, None, amount, Decimal::ZERO,
                ).unwrap()
            })
            .collect();

        // create, then edit through every intermediate state
        let mut steps = vec![effects[0].clone()];
        for pair in effects.windows(2) {
            steps.push(pair[0].reversed());
            steps.push(pair[1].clone());
        }

        let chained = fold_deltas(&steps);
        let direct = fold_deltas(&[effects.last().unwrap().clone()]);
        prop_assert_eq!(chained, direct);
    }
}
