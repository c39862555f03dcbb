//! Integration tests for the transaction repository write path.
//!
//! Requires a migrated database at `DATABASE_URL`.

mod common;

use rust_decimal_macros::dec;

use cashbook_core::ledger::{
    CategoryRef, LedgerError, SplitRequest, TransactionKind, TransactionPatch,
};
use cashbook_db::repositories::{StatusRepository, StoreError, TransactionRepository};
use cashbook_shared::types::{AccountId, TransactionId};

use common::{balance_of, setup};

// ============================================================================
// Balance scenarios
// ============================================================================

#[tokio::test]
async fn test_income_expense_delete_scenario() {
    let ctx = setup().await;
    let repo = TransactionRepository::new(ctx.db.clone());

    // balance 1000.00; income 500 -> 1500.00
    let income = repo
        .create_transaction(ctx.org, ctx.input(TransactionKind::Income, dec!(500)))
        .await
        .expect("income should be created");
    assert_eq!(balance_of(&ctx.db, ctx.checking).await, dec!(1500.00));

    // expense 150 -> 1350.00
    repo.create_transaction(ctx.org, ctx.input(TransactionKind::Expense, dec!(150)))
        .await
        .expect("expense should be created");
    assert_eq!(balance_of(&ctx.db, ctx.checking).await, dec!(1350.00));

    // delete the income -> 850.00
    repo.delete_transaction(ctx.org, TransactionId::from_uuid(income.transaction.id))
        .await
        .expect("delete should succeed");
    assert_eq!(balance_of(&ctx.db, ctx.checking).await, dec!(850.00));
}

#[tokio::test]
async fn test_transfer_with_fee_and_restore() {
    let ctx = setup().await;
    let repo = TransactionRepository::new(ctx.db.clone());

    // checking 1000.00 (fee 10), savings 500.00; transfer 300 with the fee
    let mut input = ctx.input(TransactionKind::Transfer, dec!(300));
    input.apply_fee = true;
    let transfer = repo
        .create_transaction(ctx.org, input)
        .await
        .expect("transfer should be created");

    assert_eq!(balance_of(&ctx.db, ctx.checking).await, dec!(690.00));
    assert_eq!(balance_of(&ctx.db, ctx.savings).await, dec!(800.00));
    // The applied fee is persisted on the row.
    assert_eq!(transfer.transaction.fee_amount, Some(dec!(10.00)));

    // deleting the transfer restores both balances exactly
    repo.delete_transaction(ctx.org, TransactionId::from_uuid(transfer.transaction.id))
        .await
        .expect("delete should succeed");
    assert_eq!(balance_of(&ctx.db, ctx.checking).await, dec!(1000.00));
    assert_eq!(balance_of(&ctx.db, ctx.savings).await, dec!(500.00));
}

#[tokio::test]
async fn test_explicit_fee_overrides_account_default() {
    let ctx = setup().await;
    let repo = TransactionRepository::new(ctx.db.clone());

    let mut input = ctx.input(TransactionKind::Expense, dec!(100));
    input.apply_fee = true;
    input.fee = Some(dec!(2.50));
    repo.create_transaction(ctx.org, input)
        .await
        .expect("expense should be created");

    assert_eq!(balance_of(&ctx.db, ctx.checking).await, dec!(897.50));
}

#[tokio::test]
async fn test_income_to_expense_reversal() {
    let ctx = setup().await;
    let repo = TransactionRepository::new(ctx.db.clone());

    let created = repo
        .create_transaction(ctx.org, ctx.input(TransactionKind::Income, dec!(200)))
        .await
        .expect("income should be created");
    assert_eq!(balance_of(&ctx.db, ctx.checking).await, dec!(1200.00));

    // Same amount, kind flipped: source moves by exactly -2 * amount.
    let patch = TransactionPatch {
        kind: Some(TransactionKind::Expense),
        ..Default::default()
    };
    repo.update_transaction(
        ctx.org,
        TransactionId::from_uuid(created.transaction.id),
        ctx.user,
        1,
        false,
        patch,
    )
    .await
    .expect("update should succeed");

    assert_eq!(balance_of(&ctx.db, ctx.checking).await, dec!(800.00));
}

#[tokio::test]
async fn test_expense_to_transfer_conversion() {
    let ctx = setup().await;
    let repo = TransactionRepository::new(ctx.db.clone());

    let created = repo
        .create_transaction(ctx.org, ctx.input(TransactionKind::Expense, dec!(100)))
        .await
        .expect("expense should be created");
    assert_eq!(balance_of(&ctx.db, ctx.checking).await, dec!(900.00));

    // Converting to a transfer nets the source and credits the destination.
    let patch = TransactionPatch {
        kind: Some(TransactionKind::Transfer),
        destination_account_id: Some(Some(ctx.savings)),
        ..Default::default()
    };
    repo.update_transaction(
        ctx.org,
        TransactionId::from_uuid(created.transaction.id),
        ctx.user,
        1,
        false,
        patch,
    )
    .await
    .expect("conversion should succeed");

    assert_eq!(balance_of(&ctx.db, ctx.checking).await, dec!(900.00));
    assert_eq!(balance_of(&ctx.db, ctx.savings).await, dec!(600.00));
}

// ============================================================================
// Transfer shape validation
// ============================================================================

#[tokio::test]
async fn test_transfer_without_destination_rejected() {
    let ctx = setup().await;
    let repo = TransactionRepository::new(ctx.db.clone());

    let mut input = ctx.input(TransactionKind::Transfer, dec!(50));
    input.destination_account_id = None;
    let result = repo.create_transaction(ctx.org, input).await;

    assert!(matches!(
        result,
        Err(StoreError::Ledger(LedgerError::TransferMissingDestination))
    ));
    assert_eq!(balance_of(&ctx.db, ctx.checking).await, dec!(1000.00));
}

#[tokio::test]
async fn test_transfer_to_same_account_rejected() {
    let ctx = setup().await;
    let repo = TransactionRepository::new(ctx.db.clone());

    let mut input = ctx.input(TransactionKind::Transfer, dec!(50));
    input.destination_account_id = Some(ctx.checking);
    let result = repo.create_transaction(ctx.org, input).await;

    assert!(matches!(
        result,
        Err(StoreError::Ledger(LedgerError::TransferSameAccount))
    ));
}

#[tokio::test]
async fn test_expense_with_destination_rejected() {
    let ctx = setup().await;
    let repo = TransactionRepository::new(ctx.db.clone());

    let mut input = ctx.input(TransactionKind::Expense, dec!(50));
    input.destination_account_id = Some(ctx.savings);
    let result = repo.create_transaction(ctx.org, input).await;

    assert!(matches!(
        result,
        Err(StoreError::Ledger(LedgerError::DestinationNotAllowed))
    ));
}

#[tokio::test]
async fn test_foreign_destination_reads_as_not_found() {
    let ctx = setup().await;
    let other = setup().await; // different organization
    let repo = TransactionRepository::new(ctx.db.clone());

    let mut input = ctx.input(TransactionKind::Transfer, dec!(50));
    input.destination_account_id = Some(other.checking);
    let result = repo.create_transaction(ctx.org, input).await;

    assert!(matches!(
        result,
        Err(StoreError::Ledger(LedgerError::DestinationAccountNotFound(id)))
            if id == other.checking
    ));
    // No balance change anywhere on the failure path.
    assert_eq!(balance_of(&ctx.db, ctx.checking).await, dec!(1000.00));
    assert_eq!(balance_of(&ctx.db, other.checking).await, dec!(1000.00));
}

#[tokio::test]
async fn test_unknown_category_rejected() {
    let ctx = setup().await;
    let repo = TransactionRepository::new(ctx.db.clone());

    let mut input = ctx.input(TransactionKind::Expense, dec!(50));
    input.splits = vec![SplitRequest {
        category: CategoryRef::Name("No Such Category".to_string()),
        amount: dec!(50),
        memo: None,
    }];
    let result = repo.create_transaction(ctx.org, input).await;

    assert!(matches!(
        result,
        Err(StoreError::Ledger(LedgerError::CategoryNotFound(_)))
    ));
}

// ============================================================================
// Optimistic versioning
// ============================================================================

#[tokio::test]
async fn test_version_conflict_round_trip() {
    let ctx = setup().await;
    let repo = TransactionRepository::new(ctx.db.clone());

    let created = repo
        .create_transaction(ctx.org, ctx.input(TransactionKind::Expense, dec!(25)))
        .await
        .expect("create should succeed");
    let id = TransactionId::from_uuid(created.transaction.id);
    assert_eq!(created.transaction.version, 1);

    // Update with version 1 succeeds and bumps to 2.
    let patch = TransactionPatch {
        memo: Some(Some("first edit".to_string())),
        ..Default::default()
    };
    let updated = repo
        .update_transaction(ctx.org, id, ctx.user, 1, false, patch.clone())
        .await
        .expect("first update should succeed");
    assert_eq!(updated.transaction.version, 2);

    // Repeating the same update with version 1 conflicts.
    let result = repo
        .update_transaction(ctx.org, id, ctx.user, 1, false, patch)
        .await;

    match result {
        Err(StoreError::Ledger(LedgerError::VersionConflict(conflict))) => {
            assert_eq!(conflict.current_version, 2);
            assert_eq!(conflict.submitted_version, 1);
            assert_eq!(conflict.last_modified_by, Some(ctx.user));
            assert_eq!(
                conflict.last_modified_by_name.as_deref(),
                Some("Avery Example")
            );
            assert_eq!(conflict.current_state.version, 2);
            assert_eq!(
                conflict.current_state.memo.as_deref(),
                Some("first edit")
            );
        }
        other => panic!("Expected VersionConflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_force_save_bypasses_stale_version() {
    let ctx = setup().await;
    let repo = TransactionRepository::new(ctx.db.clone());

    let created = repo
        .create_transaction(ctx.org, ctx.input(TransactionKind::Expense, dec!(25)))
        .await
        .expect("create should succeed");
    let id = TransactionId::from_uuid(created.transaction.id);

    repo.update_transaction(
        ctx.org,
        id,
        ctx.user,
        1,
        false,
        TransactionPatch {
            memo: Some(Some("first edit".to_string())),
            ..Default::default()
        },
    )
    .await
    .expect("first update should succeed");

    // Stale version 1, but forced: succeeds and bumps to 3.
    let forced = repo
        .update_transaction(
            ctx.org,
            id,
            ctx.user,
            1,
            true,
            TransactionPatch {
                memo: Some(Some("forced edit".to_string())),
                ..Default::default()
            },
        )
        .await
        .expect("forced update should succeed");
    assert_eq!(forced.transaction.version, 3);
    assert_eq!(forced.transaction.memo.as_deref(), Some("forced edit"));
}

#[tokio::test]
async fn test_non_positive_version_rejected() {
    let ctx = setup().await;
    let repo = TransactionRepository::new(ctx.db.clone());

    let created = repo
        .create_transaction(ctx.org, ctx.input(TransactionKind::Expense, dec!(25)))
        .await
        .expect("create should succeed");

    let result = repo
        .update_transaction(
            ctx.org,
            TransactionId::from_uuid(created.transaction.id),
            ctx.user,
            0,
            false,
            TransactionPatch::default(),
        )
        .await;

    assert!(matches!(
        result,
        Err(StoreError::Ledger(LedgerError::InvalidVersion(0)))
    ));
}

#[tokio::test]
async fn test_update_missing_transaction() {
    let ctx = setup().await;
    let repo = TransactionRepository::new(ctx.db.clone());

    let missing = TransactionId::new();
    let result = repo
        .update_transaction(ctx.org, missing, ctx.user, 1, false, TransactionPatch::default())
        .await;

    assert!(matches!(
        result,
        Err(StoreError::Ledger(LedgerError::TransactionNotFound(id))) if id == missing
    ));
}

// ============================================================================
// Reconciled immutability
// ============================================================================

#[tokio::test]
async fn test_reconciled_rejects_update_and_delete() {
    let ctx = setup().await;
    let repo = TransactionRepository::new(ctx.db.clone());
    let status_repo = StatusRepository::new(ctx.db.clone());

    let created = repo
        .create_transaction(ctx.org, ctx.input(TransactionKind::Expense, dec!(25)))
        .await
        .expect("create should succeed");
    let id = TransactionId::from_uuid(created.transaction.id);

    use cashbook_core::ledger::TransactionStatus;
    status_repo
        .change_status(ctx.org, id, ctx.user, TransactionStatus::Cleared, None)
        .await
        .expect("clearing should succeed");
    status_repo
        .change_status(ctx.org, id, ctx.user, TransactionStatus::Reconciled, None)
        .await
        .expect("reconciling should succeed");

    // Correct version, even forced: still immutable.
    let result = repo
        .update_transaction(ctx.org, id, ctx.user, 2, true, TransactionPatch::default())
        .await;
    assert!(matches!(
        result,
        Err(StoreError::Ledger(LedgerError::ReconciledImmutable(_)))
    ));

    let result = repo.delete_transaction(ctx.org, id).await;
    assert!(matches!(
        result,
        Err(StoreError::Ledger(LedgerError::ReconciledImmutable(_)))
    ));
    assert_eq!(balance_of(&ctx.db, ctx.checking).await, dec!(975.00));
}

// ============================================================================
// Edit history
// ============================================================================

#[tokio::test]
async fn test_edit_history_newest_first() {
    let ctx = setup().await;
    let repo = TransactionRepository::new(ctx.db.clone());

    let created = repo
        .create_transaction(ctx.org, ctx.input(TransactionKind::Expense, dec!(80)))
        .await
        .expect("create should succeed");
    let id = TransactionId::from_uuid(created.transaction.id);

    repo.update_transaction(
        ctx.org,
        id,
        ctx.user,
        1,
        false,
        TransactionPatch {
            amount: Some(dec!(95)),
            ..Default::default()
        },
    )
    .await
    .expect("update should succeed");

    let history = repo
        .get_edit_history(ctx.org, id)
        .await
        .expect("history should load");
    assert_eq!(history.len(), 2);

    use cashbook_db::entities::sea_orm_active_enums::EditType;
    // Newest first: the update, then the creation entry.
    assert_eq!(history[0].edit_type, EditType::Update);
    assert_eq!(history[1].edit_type, EditType::Create);

    // The update entry carries the amount diff and the full prior snapshot.
    let changes = history[0].changes.as_array().expect("changes is an array");
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0]["field"], "amount");
    let snapshot = history[0]
        .previous_state
        .as_ref()
        .expect("snapshot stored for updates");
    assert_eq!(snapshot["version"], serde_json::json!(1));
    let amount: rust_decimal::Decimal = snapshot["amount"]
        .as_str()
        .expect("amounts snapshot as decimal strings")
        .parse()
        .unwrap();
    assert_eq!(amount, dec!(80));

    // Creation entries have no prior state.
    assert!(history[1].previous_state.is_none());
}

#[tokio::test]
async fn test_split_change_classification() {
    let ctx = setup().await;
    let repo = TransactionRepository::new(ctx.db.clone());

    let created = repo
        .create_transaction(ctx.org, ctx.input(TransactionKind::Expense, dec!(80)))
        .await
        .expect("create should succeed");
    let id = TransactionId::from_uuid(created.transaction.id);

    // Split the same amount across two categories.
    let patch = TransactionPatch {
        splits: Some(vec![
            SplitRequest {
                category: CategoryRef::Id(ctx.category),
                amount: dec!(30),
                memo: None,
            },
            SplitRequest {
                category: CategoryRef::Name("General".to_string()),
                amount: dec!(50),
                memo: None,
            },
        ]),
        ..Default::default()
    };
    let updated = repo
        .update_transaction(ctx.org, id, ctx.user, 1, false, patch)
        .await
        .expect("split update should succeed");
    assert_eq!(updated.splits.len(), 2);

    use cashbook_db::entities::sea_orm_active_enums::EditType;
    let history = repo
        .get_edit_history(ctx.org, id)
        .await
        .expect("history should load");
    assert_eq!(history[0].edit_type, EditType::SplitChange);
}

// ============================================================================
// Organization scoping
// ============================================================================

#[tokio::test]
async fn test_foreign_transaction_reads_as_not_found() {
    let ctx = setup().await;
    let other = setup().await;
    let repo = TransactionRepository::new(ctx.db.clone());

    let created = repo
        .create_transaction(other.org, other.input(TransactionKind::Expense, dec!(10)))
        .await
        .expect("create should succeed");

    let result = repo
        .get_transaction(ctx.org, TransactionId::from_uuid(created.transaction.id))
        .await;
    assert!(matches!(
        result,
        Err(StoreError::Ledger(LedgerError::TransactionNotFound(_)))
    ));
}

#[tokio::test]
async fn test_create_on_missing_account() {
    let ctx = setup().await;
    let repo = TransactionRepository::new(ctx.db.clone());

    let missing = AccountId::new();
    let mut input = ctx.input(TransactionKind::Expense, dec!(10));
    input.account_id = missing;
    let result = repo.create_transaction(ctx.org, input).await;

    assert!(matches!(
        result,
        Err(StoreError::Ledger(LedgerError::AccountNotFound(id))) if id == missing
    ));
}
