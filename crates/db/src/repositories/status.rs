//! Status repository: the clearing/reconciliation lifecycle.
//!
//! Status changes run on a narrower path than edits: no version check and
//! no balance math, just the state machine, its timestamp side effects,
//! and an append-only history row — all inside one database transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use cashbook_core::ledger::{
    self, transition_timestamps, validate_transition, BulkStatusOutcome, StatusTimestamps,
};
use cashbook_shared::types::{AccountId, OrganizationId, TransactionId, UserId};

use crate::entities::{transaction_status_history, transactions};

use super::error::StoreError;
use super::transaction::ensure_transaction;

/// Status repository for lifecycle transitions.
#[derive(Debug, Clone)]
pub struct StatusRepository {
    db: DatabaseConnection,
}

impl StatusRepository {
    /// Creates a new status repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Transitions a transaction to a new status.
    ///
    /// Validates the transition, applies the timestamp side effects, and
    /// appends the status-history row atomically. The transaction's
    /// `version` is untouched — status changes are tracked separately
    /// from edits.
    ///
    /// # Errors
    ///
    /// `TransactionNotFound` if the id does not resolve in the
    /// organization; `InvalidTransition` for disallowed transitions,
    /// including same-state changes and anything leaving reconciled.
    pub async fn change_status(
        &self,
        organization_id: OrganizationId,
        transaction_id: TransactionId,
        actor: UserId,
        target: ledger::TransactionStatus,
        notes: Option<String>,
    ) -> Result<transaction_status_history::Model, StoreError> {
        self.change_status_scoped(organization_id, None, transaction_id, actor, target, notes)
            .await
    }

    /// Changes the status of many transactions independently.
    ///
    /// Each id commits (or fails) on its own; failures are collected with
    /// human-readable reasons so the caller can retry just those. Ids
    /// outside the given account read as not found.
    pub async fn bulk_change_status(
        &self,
        organization_id: OrganizationId,
        account_id: AccountId,
        actor: UserId,
        transaction_ids: &[TransactionId],
        target: ledger::TransactionStatus,
        notes: Option<String>,
    ) -> BulkStatusOutcome {
        let mut outcome = BulkStatusOutcome::default();

        for &transaction_id in transaction_ids {
            let result = self
                .change_status_scoped(
                    organization_id,
                    Some(account_id),
                    transaction_id,
                    actor,
                    target,
                    notes.clone(),
                )
                .await;

            match result {
                Ok(_) => outcome.record_success(transaction_id),
                Err(err) => outcome.record_failure(transaction_id, err.to_string()),
            }
        }

        tracing::info!(
            target_status = %target,
            successful = outcome.successful.len(),
            failed = outcome.failed.len(),
            "bulk status change finished"
        );

        outcome
    }

    /// Returns the status history of a transaction, newest first.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if the id does not resolve in the
    /// organization.
    pub async fn get_status_history(
        &self,
        organization_id: OrganizationId,
        transaction_id: TransactionId,
    ) -> Result<Vec<transaction_status_history::Model>, StoreError> {
        ensure_transaction(&self.db, organization_id, transaction_id).await?;

        let history = transaction_status_history::Entity::find()
            .filter(
                transaction_status_history::Column::TransactionId
                    .eq(transaction_id.into_inner()),
            )
            .order_by_desc(transaction_status_history::Column::ChangedAt)
            .order_by_desc(transaction_status_history::Column::Id)
            .all(&self.db)
            .await?;

        Ok(history)
    }

    async fn change_status_scoped(
        &self,
        organization_id: OrganizationId,
        account_id: Option<AccountId>,
        transaction_id: TransactionId,
        actor: UserId,
        target: ledger::TransactionStatus,
        notes: Option<String>,
    ) -> Result<transaction_status_history::Model, StoreError> {
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let mut query = transactions::Entity::find_by_id(transaction_id.into_inner())
            .filter(transactions::Column::OrganizationId.eq(organization_id.into_inner()));
        if let Some(account_id) = account_id {
            query = query.filter(transactions::Column::AccountId.eq(account_id.into_inner()));
        }
        let model = query
            .one(&txn)
            .await?
            .ok_or(ledger::LedgerError::TransactionNotFound(transaction_id))?;

        let from: ledger::TransactionStatus = model.status.into();
        validate_transition(from, target)?;

        let stamped = transition_timestamps(
            target,
            now,
            StatusTimestamps {
                cleared_at: model.cleared_at.map(|t| t.with_timezone(&Utc)),
                reconciled_at: model.reconciled_at.map(|t| t.with_timezone(&Utc)),
            },
        );

        // Status changes bump neither `version` nor `updated_at`; those
        // belong to the edit path.
        let mut active: transactions::ActiveModel = model.into();
        active.status = Set(target.into());
        active.cleared_at = Set(stamped.cleared_at.map(Into::into));
        active.reconciled_at = Set(stamped.reconciled_at.map(Into::into));
        active.update(&txn).await?;

        let history = transaction_status_history::ActiveModel {
            id: Set(Uuid::now_v7()),
            transaction_id: Set(transaction_id.into_inner()),
            from_status: Set(from.into()),
            to_status: Set(target.into()),
            changed_by: Set(actor.into_inner()),
            notes: Set(notes),
            changed_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        tracing::debug!(
            transaction_id = %transaction_id,
            from = %from,
            to = %target,
            "status changed"
        );

        Ok(history)
    }
}
