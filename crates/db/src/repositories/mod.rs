//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Every mutating operation runs inside a single database
//! transaction so balances, versions, and history stay consistent.

pub mod account;
pub mod error;
pub mod reconciliation;
pub mod status;
pub mod transaction;

pub use account::{AccountRepository, CreateAccountInput};
pub use error::StoreError;
pub use reconciliation::ReconciliationRepository;
pub use status::StatusRepository;
pub use transaction::{TransactionFilter, TransactionRepository, TransactionWithSplits};
