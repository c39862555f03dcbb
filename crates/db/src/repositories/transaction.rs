//! Transaction repository: the versioned ledger write path.
//!
//! Every mutation here runs as one database transaction covering the
//! version check, the balance deltas, the row write, and the edit-history
//! append. A failure at any step rolls the whole unit back; balances,
//! versions, and history can never drift apart.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde_json::json;
use uuid::Uuid;

use cashbook_core::ledger::{
    self, build_previous_state, classify, detect_changes, fold_deltas, resolve_fee, CategoryRef,
    CreateTransactionInput, EditType, LedgerError, ResolvedSplit, SplitRequest, SplitState,
    TransactionEffect, TransactionPatch, TransactionState, VersionConflict, VersionError,
};
use cashbook_shared::types::{
    AccountId, CategoryId, OrganizationId, SplitId, TransactionId, UserId, VendorId,
};
use cashbook_shared::types::{PageRequest, PageResponse};

use crate::entities::{
    accounts, categories, transaction_edit_history, transaction_splits, transactions, users,
};

use super::error::StoreError;

/// A transaction row together with its splits.
#[derive(Debug, Clone)]
pub struct TransactionWithSplits {
    /// Transaction row.
    pub transaction: transactions::Model,
    /// Split rows, in insertion order.
    pub splits: Vec<transaction_splits::Model>,
}

/// Filter options for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Restrict to one source account.
    pub account_id: Option<AccountId>,
    /// Filter by lifecycle status.
    pub status: Option<ledger::TransactionStatus>,
    /// Filter by transaction kind.
    pub kind: Option<ledger::TransactionKind>,
    /// Filter by date range start (inclusive).
    pub date_from: Option<chrono::DateTime<Utc>>,
    /// Filter by date range end (inclusive).
    pub date_to: Option<chrono::DateTime<Utc>>,
}

/// Transaction repository for the ledger write and read paths.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a transaction, applies its balance deltas, and records the
    /// creation in the edit history.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed transfer shape or
    /// negative amounts, and a not-found error for a missing source
    /// account, destination account, or split category. No balance changes
    /// on any error path.
    pub async fn create_transaction(
        &self,
        organization_id: OrganizationId,
        input: CreateTransactionInput,
    ) -> Result<TransactionWithSplits, StoreError> {
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let account = find_account(&txn, organization_id, input.account_id).await?;

        let applied_fee = resolve_fee(input.fee, account.transaction_fee, input.apply_fee);
        let effect = TransactionEffect::compute(
            input.kind,
            input.account_id,
            input.destination_account_id,
            input.amount,
            applied_fee,
        )?;

        if let Some((destination_id, _)) = effect.destination {
            find_destination(&txn, organization_id, destination_id).await?;
        }

        let resolved = resolve_splits(&txn, organization_id, &input.splits).await?;

        apply_deltas(&txn, &fold_deltas(&[effect]), now).await?;

        // The fee actually applied is persisted so a later reversal never
        // depends on the account's current fee configuration.
        let fee_amount = if input.apply_fee {
            Some(applied_fee)
        } else {
            input.fee
        };

        let transaction_id = Uuid::now_v7();
        let transaction = transactions::ActiveModel {
            id: Set(transaction_id),
            organization_id: Set(organization_id.into_inner()),
            account_id: Set(input.account_id.into_inner()),
            destination_account_id: Set(input.destination_account_id.map(AccountId::into_inner)),
            transaction_type: Set(input.kind.into()),
            amount: Set(input.amount),
            fee_amount: Set(fee_amount),
            apply_fee: Set(input.apply_fee),
            transaction_date: Set(input.date.into()),
            memo: Set(input.memo.clone()),
            vendor_id: Set(input.vendor_id.map(VendorId::into_inner)),
            status: Set(ledger::TransactionStatus::Uncleared.into()),
            cleared_at: Set(None),
            reconciled_at: Set(None),
            version: Set(1),
            created_by: Set(input.created_by.into_inner()),
            last_modified_by: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        let splits = insert_splits(&txn, transaction_id, &resolved, now).await?;

        transaction_edit_history::ActiveModel {
            id: Set(Uuid::now_v7()),
            transaction_id: Set(transaction_id),
            edited_by: Set(input.created_by.into_inner()),
            edit_type: Set(EditType::Create.into()),
            changes: Set(json!([])),
            previous_state: Set(None),
            edited_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        tracing::info!(transaction_id = %transaction_id, kind = %input.kind, "transaction created");

        Ok(TransactionWithSplits {
            transaction,
            splits,
        })
    }

    /// Applies a versioned partial update.
    ///
    /// The stored effect of the previous state is reversed and the new
    /// state's effect applied, covering kind, amount, fee, and destination
    /// changes in any combination. The edit is recorded with a field-level
    /// diff and a full snapshot of the prior state, and the version is
    /// bumped by exactly one.
    ///
    /// # Errors
    ///
    /// `TransactionNotFound` if the id does not resolve in the
    /// organization; `ReconciledImmutable` regardless of version or
    /// `force`; `InvalidVersion` for a submitted version below 1;
    /// `VersionConflict` (with resolution metadata) when the submitted
    /// version is stale and `force` is not set; plus the creation-path
    /// validation and not-found errors for the patched state.
    pub async fn update_transaction(
        &self,
        organization_id: OrganizationId,
        transaction_id: TransactionId,
        actor: UserId,
        submitted_version: i64,
        force: bool,
        patch: TransactionPatch,
    ) -> Result<TransactionWithSplits, StoreError> {
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let (model, state) = load_state(&txn, organization_id, transaction_id).await?;

        if state.status.is_immutable() {
            return Err(LedgerError::ReconciledImmutable(transaction_id).into());
        }

        let next_version = match ledger::verify_version(state.version, submitted_version, force) {
            Ok(next) => next,
            Err(VersionError::NotPositive(version)) => {
                return Err(LedgerError::InvalidVersion(version).into());
            }
            Err(VersionError::Stale { .. }) => {
                let conflict =
                    build_conflict(&txn, &model, &state, submitted_version).await?;
                return Err(LedgerError::VersionConflict(Box::new(conflict)).into());
            }
        };

        // Resolve the patched state: absent fields keep their stored value.
        let new_kind = patch.kind.unwrap_or(state.kind);
        let new_amount = patch.amount.unwrap_or(state.amount);
        let new_date = patch.date.unwrap_or(state.date);
        let new_memo = patch.memo.clone().unwrap_or_else(|| state.memo.clone());
        let new_vendor = patch.vendor_id.unwrap_or(state.vendor_id);
        let new_destination = patch
            .destination_account_id
            .unwrap_or(state.destination_account_id);
        let new_apply_fee = patch.apply_fee.unwrap_or(state.apply_fee);
        let explicit_fee = patch.fee.unwrap_or(state.fee_amount);

        let account = find_account(&txn, organization_id, state.account_id).await?;
        let applied_fee = resolve_fee(explicit_fee, account.transaction_fee, new_apply_fee);

        let old_effect = TransactionEffect::of_state(&state)?;
        let new_effect = TransactionEffect::compute(
            new_kind,
            state.account_id,
            new_destination,
            new_amount,
            applied_fee,
        )?;

        if let Some((destination_id, _)) = new_effect.destination {
            if state.destination_account_id != Some(destination_id) {
                find_destination(&txn, organization_id, destination_id).await?;
            }
        }

        let resolved = match &patch.splits {
            Some(splits) => Some(resolve_splits(&txn, organization_id, splits).await?),
            None => None,
        };

        // Diff and snapshot against the state as it was before this edit.
        let changes = detect_changes(&state, &patch, resolved.as_deref());
        let edit_type = classify(&changes);
        let previous_state = build_previous_state(&state);

        apply_deltas(&txn, &fold_deltas(&[old_effect.reversed(), new_effect]), now).await?;

        let fee_amount = if new_apply_fee {
            Some(applied_fee)
        } else {
            explicit_fee
        };

        let mut active: transactions::ActiveModel = model.into();
        active.transaction_type = Set(new_kind.into());
        active.amount = Set(new_amount);
        active.fee_amount = Set(fee_amount);
        active.apply_fee = Set(new_apply_fee);
        active.transaction_date = Set(new_date.into());
        active.memo = Set(new_memo);
        active.vendor_id = Set(new_vendor.map(VendorId::into_inner));
        active.destination_account_id = Set(new_destination.map(AccountId::into_inner));
        active.version = Set(next_version);
        active.last_modified_by = Set(Some(actor.into_inner()));
        active.updated_at = Set(now.into());
        let updated = active.update(&txn).await?;

        let splits = match resolved {
            Some(new_splits) => {
                transaction_splits::Entity::delete_many()
                    .filter(
                        transaction_splits::Column::TransactionId
                            .eq(transaction_id.into_inner()),
                    )
                    .exec(&txn)
                    .await?;
                insert_splits(&txn, transaction_id.into_inner(), &new_splits, now).await?
            }
            None => load_splits(&txn, transaction_id.into_inner()).await?,
        };

        // The snapshot is stored even when no field changed, so any
        // historical version can be reconstructed later.
        transaction_edit_history::ActiveModel {
            id: Set(Uuid::now_v7()),
            transaction_id: Set(transaction_id.into_inner()),
            edited_by: Set(actor.into_inner()),
            edit_type: Set(edit_type.into()),
            changes: Set(json!(changes)),
            previous_state: Set(Some(previous_state)),
            edited_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        tracing::info!(
            transaction_id = %transaction_id,
            version = next_version,
            forced = force,
            "transaction updated"
        );

        Ok(TransactionWithSplits {
            transaction: updated,
            splits,
        })
    }

    /// Deletes a transaction, reversing its balance effect.
    ///
    /// Deletion takes no caller version: once the id resolves the row is
    /// removed, cascading its splits and history. Reconciled transactions
    /// are refused.
    ///
    /// # Errors
    ///
    /// `TransactionNotFound` if the id does not resolve in the
    /// organization; `ReconciledImmutable` for reconciled transactions.
    pub async fn delete_transaction(
        &self,
        organization_id: OrganizationId,
        transaction_id: TransactionId,
    ) -> Result<(), StoreError> {
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let (_, state) = load_state(&txn, organization_id, transaction_id).await?;

        if state.status.is_immutable() {
            return Err(LedgerError::ReconciledImmutable(transaction_id).into());
        }

        let effect = TransactionEffect::of_state(&state)?;
        apply_deltas(&txn, &fold_deltas(&[effect.reversed()]), now).await?;

        transactions::Entity::delete_by_id(transaction_id.into_inner())
            .exec(&txn)
            .await?;

        txn.commit().await?;
        tracing::info!(transaction_id = %transaction_id, "transaction deleted");

        Ok(())
    }

    /// Gets a transaction with its splits, scoped to the organization.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if the id does not resolve in the
    /// organization.
    pub async fn get_transaction(
        &self,
        organization_id: OrganizationId,
        transaction_id: TransactionId,
    ) -> Result<TransactionWithSplits, StoreError> {
        let transaction = transactions::Entity::find_by_id(transaction_id.into_inner())
            .filter(transactions::Column::OrganizationId.eq(organization_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(LedgerError::TransactionNotFound(transaction_id))?;

        let splits = load_splits(&self.db, transaction_id.into_inner()).await?;

        Ok(TransactionWithSplits {
            transaction,
            splits,
        })
    }

    /// Lists transactions with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_transactions(
        &self,
        organization_id: OrganizationId,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<PageResponse<transactions::Model>, StoreError> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::OrganizationId.eq(organization_id.into_inner()));

        if let Some(account_id) = filter.account_id {
            query = query.filter(transactions::Column::AccountId.eq(account_id.into_inner()));
        }
        if let Some(status) = filter.status {
            query = query.filter(
                transactions::Column::Status
                    .eq(crate::entities::sea_orm_active_enums::TransactionStatus::from(status)),
            );
        }
        if let Some(kind) = filter.kind {
            query = query.filter(
                transactions::Column::TransactionType
                    .eq(crate::entities::sea_orm_active_enums::TransactionType::from(kind)),
            );
        }
        if let Some(from) = filter.date_from {
            query = query.filter(transactions::Column::TransactionDate.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(transactions::Column::TransactionDate.lte(to));
        }

        let paginator = query
            .order_by_desc(transactions::Column::TransactionDate)
            .order_by_desc(transactions::Column::CreatedAt)
            .paginate(&self.db, page.limit().max(1));

        let total = paginator.num_items().await?;
        let data = paginator.fetch_page(u64::from(page.page.saturating_sub(1))).await?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Returns the edit history of a transaction, newest first.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if the id does not resolve in the
    /// organization.
    pub async fn get_edit_history(
        &self,
        organization_id: OrganizationId,
        transaction_id: TransactionId,
    ) -> Result<Vec<transaction_edit_history::Model>, StoreError> {
        ensure_transaction(&self.db, organization_id, transaction_id).await?;

        let history = transaction_edit_history::Entity::find()
            .filter(
                transaction_edit_history::Column::TransactionId.eq(transaction_id.into_inner()),
            )
            .order_by_desc(transaction_edit_history::Column::EditedAt)
            .order_by_desc(transaction_edit_history::Column::Id)
            .all(&self.db)
            .await?;

        Ok(history)
    }
}

// ============================================================================
// Shared helpers (also used by the status and reconciliation repositories)
// ============================================================================

/// Finds a source account in the organization.
pub(crate) async fn find_account<C: ConnectionTrait>(
    conn: &C,
    organization_id: OrganizationId,
    account_id: AccountId,
) -> Result<accounts::Model, StoreError> {
    accounts::Entity::find_by_id(account_id.into_inner())
        .filter(accounts::Column::OrganizationId.eq(organization_id.into_inner()))
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::AccountNotFound(account_id).into())
}

/// Finds a destination account in the organization.
///
/// A destination outside the organization reads as not found; the caller
/// never learns whether the id exists elsewhere.
async fn find_destination(
    txn: &DatabaseTransaction,
    organization_id: OrganizationId,
    account_id: AccountId,
) -> Result<accounts::Model, StoreError> {
    accounts::Entity::find_by_id(account_id.into_inner())
        .filter(accounts::Column::OrganizationId.eq(organization_id.into_inner()))
        .one(txn)
        .await?
        .ok_or_else(|| LedgerError::DestinationAccountNotFound(account_id).into())
}

/// Verifies a transaction exists in the organization.
pub(crate) async fn ensure_transaction<C: ConnectionTrait>(
    conn: &C,
    organization_id: OrganizationId,
    transaction_id: TransactionId,
) -> Result<transactions::Model, StoreError> {
    transactions::Entity::find_by_id(transaction_id.into_inner())
        .filter(transactions::Column::OrganizationId.eq(organization_id.into_inner()))
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::TransactionNotFound(transaction_id).into())
}

/// Loads a transaction row and its engine-facing state.
async fn load_state(
    txn: &DatabaseTransaction,
    organization_id: OrganizationId,
    transaction_id: TransactionId,
) -> Result<(transactions::Model, TransactionState), StoreError> {
    let model = ensure_transaction(txn, organization_id, transaction_id).await?;
    let splits = load_splits(txn, transaction_id.into_inner()).await?;
    let state = to_state(&model, &splits);
    Ok((model, state))
}

/// Loads a transaction's splits in insertion order.
async fn load_splits<C: ConnectionTrait>(
    conn: &C,
    transaction_id: Uuid,
) -> Result<Vec<transaction_splits::Model>, StoreError> {
    Ok(transaction_splits::Entity::find()
        .filter(transaction_splits::Column::TransactionId.eq(transaction_id))
        .order_by_asc(transaction_splits::Column::Id)
        .all(conn)
        .await?)
}

/// Converts storage rows into the engine's transaction state.
pub(crate) fn to_state(
    model: &transactions::Model,
    splits: &[transaction_splits::Model],
) -> TransactionState {
    TransactionState {
        id: TransactionId::from_uuid(model.id),
        account_id: AccountId::from_uuid(model.account_id),
        destination_account_id: model.destination_account_id.map(AccountId::from_uuid),
        kind: model.transaction_type.into(),
        amount: model.amount,
        fee_amount: model.fee_amount,
        apply_fee: model.apply_fee,
        date: model.transaction_date.with_timezone(&Utc),
        memo: model.memo.clone(),
        vendor_id: model.vendor_id.map(VendorId::from_uuid),
        status: model.status.into(),
        cleared_at: model.cleared_at.map(|t| t.with_timezone(&Utc)),
        reconciled_at: model.reconciled_at.map(|t| t.with_timezone(&Utc)),
        version: model.version,
        created_by: UserId::from_uuid(model.created_by),
        last_modified_by: model.last_modified_by.map(UserId::from_uuid),
        splits: splits
            .iter()
            .map(|s| SplitState {
                id: SplitId::from_uuid(s.id),
                category_id: CategoryId::from_uuid(s.category_id),
                amount: s.amount,
                memo: s.memo.clone(),
            })
            .collect(),
    }
}

/// Resolves split category references within the organization.
async fn resolve_splits(
    txn: &DatabaseTransaction,
    organization_id: OrganizationId,
    splits: &[SplitRequest],
) -> Result<Vec<ResolvedSplit>, StoreError> {
    let mut resolved = Vec::with_capacity(splits.len());

    for split in splits {
        let category_id = match &split.category {
            CategoryRef::Id(id) => {
                categories::Entity::find_by_id(id.into_inner())
                    .filter(
                        categories::Column::OrganizationId.eq(organization_id.into_inner()),
                    )
                    .one(txn)
                    .await?
                    .ok_or_else(|| LedgerError::CategoryNotFound(id.to_string()))?;
                *id
            }
            CategoryRef::Name(name) => {
                let category = categories::Entity::find()
                    .filter(
                        categories::Column::OrganizationId.eq(organization_id.into_inner()),
                    )
                    .filter(categories::Column::Name.eq(name))
                    .one(txn)
                    .await?
                    .ok_or_else(|| LedgerError::CategoryNotFound(name.clone()))?;
                CategoryId::from_uuid(category.id)
            }
        };

        resolved.push(ResolvedSplit {
            category_id,
            amount: split.amount,
            memo: split.memo.clone(),
        });
    }

    Ok(resolved)
}

/// Applies net balance deltas to the affected accounts.
async fn apply_deltas(
    txn: &DatabaseTransaction,
    deltas: &[(AccountId, Decimal)],
    now: chrono::DateTime<Utc>,
) -> Result<(), StoreError> {
    for &(account_id, delta) in deltas {
        if delta == Decimal::ZERO {
            continue;
        }

        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).add(delta),
            )
            .col_expr(
                accounts::Column::UpdatedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(now)),
            )
            .filter(accounts::Column::Id.eq(account_id.into_inner()))
            .exec(txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(LedgerError::AccountNotFound(account_id).into());
        }

        tracing::debug!(account_id = %account_id, %delta, "balance delta applied");
    }

    Ok(())
}

/// Inserts resolved splits for a transaction.
async fn insert_splits(
    txn: &DatabaseTransaction,
    transaction_id: Uuid,
    splits: &[ResolvedSplit],
    now: chrono::DateTime<Utc>,
) -> Result<Vec<transaction_splits::Model>, StoreError> {
    let mut inserted = Vec::with_capacity(splits.len());

    for split in splits {
        let row = transaction_splits::ActiveModel {
            id: Set(Uuid::now_v7()),
            transaction_id: Set(transaction_id),
            category_id: Set(split.category_id.into_inner()),
            amount: Set(split.amount),
            memo: Set(split.memo.clone()),
            created_at: Set(now.into()),
        }
        .insert(txn)
        .await?;
        inserted.push(row);
    }

    Ok(inserted)
}

/// Assembles the metadata a version conflict carries back to the caller.
async fn build_conflict(
    txn: &DatabaseTransaction,
    model: &transactions::Model,
    state: &TransactionState,
    submitted_version: i64,
) -> Result<VersionConflict, StoreError> {
    let editor = match state.last_modified_by {
        Some(user_id) => {
            users::Entity::find_by_id(user_id.into_inner())
                .one(txn)
                .await?
        }
        None => None,
    };

    Ok(VersionConflict {
        current_version: state.version,
        submitted_version,
        last_modified_by: state.last_modified_by,
        last_modified_by_name: editor.as_ref().map(|u| u.display_name.clone()),
        last_modified_by_email: editor.map(|u| u.email),
        last_modified_at: Some(model.updated_at.with_timezone(&Utc)),
        current_state: state.clone(),
    })
}
