//! Account repository for account database operations.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use cashbook_core::ledger::LedgerError;
use cashbook_shared::types::{AccountId, OrganizationId};

use crate::entities::{accounts, sea_orm_active_enums::AccountType};

use super::error::StoreError;

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Account name.
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
    /// Starting balance.
    pub opening_balance: Decimal,
    /// Default fee applied to transactions that opt in.
    pub transaction_fee: Decimal,
    /// Whether the account is active.
    pub is_active: bool,
}

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new account in the organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create_account(
        &self,
        organization_id: OrganizationId,
        input: CreateAccountInput,
    ) -> Result<accounts::Model, StoreError> {
        let now = chrono::Utc::now().into();

        let account = accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(organization_id.into_inner()),
            name: Set(input.name),
            account_type: Set(input.account_type),
            balance: Set(input.opening_balance),
            transaction_fee: Set(input.transaction_fee),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = account.insert(&self.db).await?;
        tracing::info!(account_id = %created.id, "account created");
        Ok(created)
    }

    /// Gets an account by id, scoped to the organization.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist or belongs
    /// to a different organization.
    pub async fn get_account(
        &self,
        organization_id: OrganizationId,
        account_id: AccountId,
    ) -> Result<accounts::Model, StoreError> {
        let account = accounts::Entity::find_by_id(account_id.into_inner())
            .filter(accounts::Column::OrganizationId.eq(organization_id.into_inner()))
            .one(&self.db)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        Ok(account)
    }

    /// Lists the organization's accounts, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<accounts::Model>, StoreError> {
        let accounts = accounts::Entity::find()
            .filter(accounts::Column::OrganizationId.eq(organization_id.into_inner()))
            .order_by_asc(accounts::Column::Name)
            .all(&self.db)
            .await?;

        Ok(accounts)
    }
}
