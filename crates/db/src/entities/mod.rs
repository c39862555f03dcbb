//! `SeaORM` entity definitions.

pub mod accounts;
pub mod categories;
pub mod organizations;
pub mod sea_orm_active_enums;
pub mod transaction_edit_history;
pub mod transaction_splits;
pub mod transaction_status_history;
pub mod transactions;
pub mod users;
