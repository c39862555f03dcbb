//! Reconciliation repository: read-only status summaries per account.

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};

use cashbook_core::ledger::{summarize, ReconciliationSummary};
use cashbook_shared::types::{AccountId, OrganizationId};

use crate::entities::{sea_orm_active_enums::TransactionStatus, transactions};

use super::error::StoreError;
use super::transaction::find_account;

/// Reconciliation repository for summary reads.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    db: DatabaseConnection,
}

impl ReconciliationRepository {
    /// Creates a new reconciliation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Summarizes an account's transactions by status.
    ///
    /// Counts and amount totals per status group, plus an overall bucket
    /// equal to the sum of the three. Never mutates state.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist or belongs
    /// to a different organization.
    pub async fn get_reconciliation_summary(
        &self,
        organization_id: OrganizationId,
        account_id: AccountId,
    ) -> Result<ReconciliationSummary, StoreError> {
        let account = find_account(&self.db, organization_id, account_id).await?;

        let rows: Vec<(TransactionStatus, Decimal)> = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::Status)
            .column(transactions::Column::Amount)
            .filter(transactions::Column::AccountId.eq(account_id.into_inner()))
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(summarize(
            account_id,
            account.name,
            rows.into_iter().map(|(status, amount)| (status.into(), amount)),
        ))
    }
}
