//! Initial database migration.
//!
//! Creates the enums, core tables, and indexes for the transaction ledger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: ORGANIZATIONS & USERS
        // ============================================================
        db.execute_unprepared(ORGANIZATIONS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;

        // ============================================================
        // PART 3: ACCOUNTS & CATEGORIES
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(CATEGORIES_SQL).await?;

        // ============================================================
        // PART 4: TRANSACTIONS & SPLITS
        // ============================================================
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(TRANSACTION_SPLITS_SQL).await?;

        // ============================================================
        // PART 5: HISTORY TABLES
        // ============================================================
        db.execute_unprepared(STATUS_HISTORY_SQL).await?;
        db.execute_unprepared(EDIT_HISTORY_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Account types
CREATE TYPE account_type AS ENUM (
    'checking',
    'savings',
    'cash',
    'credit_card',
    'investment',
    'other'
);

-- Transaction kinds
CREATE TYPE transaction_type AS ENUM ('income', 'expense', 'transfer');

-- Clearing/reconciliation lifecycle
CREATE TYPE transaction_status AS ENUM ('uncleared', 'cleared', 'reconciled');

-- Edit history classification
CREATE TYPE edit_type AS ENUM ('create', 'update', 'split_change');
";

const ORGANIZATIONS_SQL: &str = r"
CREATE TABLE organizations (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    display_name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id),
    name TEXT NOT NULL,
    account_type account_type NOT NULL,
    balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    transaction_fee NUMERIC(19, 4) NOT NULL DEFAULT 0
        CHECK (transaction_fee >= 0),
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_accounts_organization ON accounts(organization_id);
";

const CATEGORIES_SQL: &str = r"
CREATE TABLE categories (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id),
    name TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (organization_id, name)
);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL REFERENCES organizations(id),
    account_id UUID NOT NULL REFERENCES accounts(id),
    destination_account_id UUID REFERENCES accounts(id),
    transaction_type transaction_type NOT NULL,
    amount NUMERIC(19, 4) NOT NULL CHECK (amount >= 0),
    fee_amount NUMERIC(19, 4) CHECK (fee_amount IS NULL OR fee_amount >= 0),
    apply_fee BOOLEAN NOT NULL DEFAULT FALSE,
    transaction_date TIMESTAMPTZ NOT NULL,
    memo TEXT,
    vendor_id UUID,
    status transaction_status NOT NULL DEFAULT 'uncleared',
    cleared_at TIMESTAMPTZ,
    reconciled_at TIMESTAMPTZ,
    version BIGINT NOT NULL DEFAULT 1 CHECK (version >= 1),
    created_by UUID NOT NULL REFERENCES users(id),
    last_modified_by UUID REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    -- A destination is present exactly for transfers, and never the source.
    CONSTRAINT chk_transfer_destination CHECK (
        (transaction_type = 'transfer') = (destination_account_id IS NOT NULL)
    ),
    CONSTRAINT chk_destination_differs CHECK (
        destination_account_id IS DISTINCT FROM account_id
    )
);

CREATE INDEX idx_transactions_account ON transactions(account_id, status);
CREATE INDEX idx_transactions_organization ON transactions(organization_id);
CREATE INDEX idx_transactions_date ON transactions(account_id, transaction_date DESC);
";

const TRANSACTION_SPLITS_SQL: &str = r"
CREATE TABLE transaction_splits (
    id UUID PRIMARY KEY,
    transaction_id UUID NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
    category_id UUID NOT NULL REFERENCES categories(id),
    amount NUMERIC(19, 4) NOT NULL,
    memo TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_transaction_splits_transaction ON transaction_splits(transaction_id);
CREATE INDEX idx_transaction_splits_category ON transaction_splits(category_id);
";

const STATUS_HISTORY_SQL: &str = r"
CREATE TABLE transaction_status_history (
    id UUID PRIMARY KEY,
    transaction_id UUID NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
    from_status transaction_status NOT NULL,
    to_status transaction_status NOT NULL,
    changed_by UUID NOT NULL REFERENCES users(id),
    notes TEXT,
    changed_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_status_history_transaction
    ON transaction_status_history(transaction_id, changed_at DESC);
";

const EDIT_HISTORY_SQL: &str = r"
CREATE TABLE transaction_edit_history (
    id UUID PRIMARY KEY,
    transaction_id UUID NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
    edited_by UUID NOT NULL REFERENCES users(id),
    edit_type edit_type NOT NULL,
    changes JSONB NOT NULL DEFAULT '[]',
    previous_state JSONB,
    edited_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_edit_history_transaction
    ON transaction_edit_history(transaction_id, edited_at DESC);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS transaction_edit_history;
DROP TABLE IF EXISTS transaction_status_history;
DROP TABLE IF EXISTS transaction_splits;
DROP TABLE IF EXISTS transactions;
DROP TABLE IF EXISTS categories;
DROP TABLE IF EXISTS accounts;
DROP TABLE IF EXISTS users;
DROP TABLE IF EXISTS organizations;
DROP TYPE IF EXISTS edit_type;
DROP TYPE IF EXISTS transaction_status;
DROP TYPE IF EXISTS transaction_type;
DROP TYPE IF EXISTS account_type;
";
