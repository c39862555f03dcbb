//! Database enum types mapped to Postgres enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use cashbook_core::ledger;

/// Account classification.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Checking account.
    #[sea_orm(string_value = "checking")]
    Checking,
    /// Savings account.
    #[sea_orm(string_value = "savings")]
    Savings,
    /// Physical cash.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Credit card account.
    #[sea_orm(string_value = "credit_card")]
    CreditCard,
    /// Investment account.
    #[sea_orm(string_value = "investment")]
    Investment,
    /// Anything else.
    #[sea_orm(string_value = "other")]
    Other,
}

/// Transaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money entering the source account.
    #[sea_orm(string_value = "income")]
    Income,
    /// Money leaving the source account.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Money moving between two accounts.
    #[sea_orm(string_value = "transfer")]
    Transfer,
}

/// Transaction lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_status")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Not yet seen on a bank statement.
    #[sea_orm(string_value = "uncleared")]
    Uncleared,
    /// Matched against a bank statement line.
    #[sea_orm(string_value = "cleared")]
    Cleared,
    /// Locked in by reconciliation.
    #[sea_orm(string_value = "reconciled")]
    Reconciled,
}

/// Edit-history entry classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "edit_type")]
#[serde(rename_all = "snake_case")]
pub enum EditType {
    /// The transaction was created.
    #[sea_orm(string_value = "create")]
    Create,
    /// Scalar fields changed.
    #[sea_orm(string_value = "update")]
    Update,
    /// The split set changed.
    #[sea_orm(string_value = "split_change")]
    SplitChange,
}

// Conversions between the storage enums and the engine's domain enums.

impl From<TransactionType> for ledger::TransactionKind {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Income => Self::Income,
            TransactionType::Expense => Self::Expense,
            TransactionType::Transfer => Self::Transfer,
        }
    }
}

impl From<ledger::TransactionKind> for TransactionType {
    fn from(value: ledger::TransactionKind) -> Self {
        match value {
            ledger::TransactionKind::Income => Self::Income,
            ledger::TransactionKind::Expense => Self::Expense,
            ledger::TransactionKind::Transfer => Self::Transfer,
        }
    }
}

impl From<TransactionStatus> for ledger::TransactionStatus {
    fn from(value: TransactionStatus) -> Self {
        match value {
            TransactionStatus::Uncleared => Self::Uncleared,
            TransactionStatus::Cleared => Self::Cleared,
            TransactionStatus::Reconciled => Self::Reconciled,
        }
    }
}

impl From<ledger::TransactionStatus> for TransactionStatus {
    fn from(value: ledger::TransactionStatus) -> Self {
        match value {
            ledger::TransactionStatus::Uncleared => Self::Uncleared,
            ledger::TransactionStatus::Cleared => Self::Cleared,
            ledger::TransactionStatus::Reconciled => Self::Reconciled,
        }
    }
}

impl From<ledger::EditType> for EditType {
    fn from(value: ledger::EditType) -> Self {
        match value {
            ledger::EditType::Create => Self::Create,
            ledger::EditType::Update => Self::Update,
            ledger::EditType::SplitChange => Self::SplitChange,
        }
    }
}
