//! `SeaORM` Entity for the transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{TransactionStatus, TransactionType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub account_id: Uuid,
    pub destination_account_id: Option<Uuid>,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub fee_amount: Option<Decimal>,
    pub apply_fee: bool,
    pub transaction_date: DateTimeWithTimeZone,
    pub memo: Option<String>,
    pub vendor_id: Option<Uuid>,
    pub status: TransactionStatus,
    pub cleared_at: Option<DateTimeWithTimeZone>,
    pub reconciled_at: Option<DateTimeWithTimeZone>,
    pub version: i64,
    pub created_by: Uuid,
    pub last_modified_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrganizationId",
        to = "super::organizations::Column::Id"
    )]
    Organizations,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::transaction_splits::Entity")]
    TransactionSplits,
    #[sea_orm(has_many = "super::transaction_status_history::Entity")]
    TransactionStatusHistory,
    #[sea_orm(has_many = "super::transaction_edit_history::Entity")]
    TransactionEditHistory,
}

impl Related<super::organizations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizations.def()
    }
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::transaction_splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionSplits.def()
    }
}

impl Related<super::transaction_status_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionStatusHistory.def()
    }
}

impl Related<super::transaction_edit_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionEditHistory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
