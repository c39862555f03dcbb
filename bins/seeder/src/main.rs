//! Database seeder for Cashbook development and testing.
//!
//! Seeds a test organization, user, accounts, and spending categories for
//! local development and testing purposes.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use cashbook_db::entities::{
    accounts, categories, organizations, sea_orm_active_enums::AccountType, users,
};
use cashbook_shared::AppConfig;

/// Test organization ID (consistent for all seeds)
const TEST_ORG_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Test user ID (consistent for all seeds)
const TEST_USER_ID: &str = "00000000-0000-0000-0000-000000000002";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = AppConfig::load().expect("Failed to load configuration");

    tracing::info!("Connecting to database...");
    let db = cashbook_db::connect(&config.database)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Seeding test user...");
    seed_test_user(&db).await;

    tracing::info!("Seeding test organization...");
    seed_test_organization(&db).await;

    tracing::info!("Seeding accounts...");
    seed_accounts(&db).await;

    tracing::info!("Seeding categories...");
    seed_categories(&db).await;

    tracing::info!("Seeding complete!");
}

fn test_org_id() -> Uuid {
    Uuid::parse_str(TEST_ORG_ID).unwrap()
}

fn test_user_id() -> Uuid {
    Uuid::parse_str(TEST_USER_ID).unwrap()
}

async fn seed_test_user(db: &DatabaseConnection) {
    let existing = users::Entity::find_by_id(test_user_id())
        .one(db)
        .await
        .expect("Failed to query users");

    if existing.is_some() {
        tracing::info!("Test user already exists, skipping");
        return;
    }

    users::ActiveModel {
        id: Set(test_user_id()),
        display_name: Set("Test Bookkeeper".to_string()),
        email: Set("bookkeeper@example.com".to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("Failed to seed test user");
}

async fn seed_test_organization(db: &DatabaseConnection) {
    let existing = organizations::Entity::find_by_id(test_org_id())
        .one(db)
        .await
        .expect("Failed to query organizations");

    if existing.is_some() {
        tracing::info!("Test organization already exists, skipping");
        return;
    }

    let now = Utc::now().into();
    organizations::ActiveModel {
        id: Set(test_org_id()),
        name: Set("Acme Workshop".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to seed test organization");
}

async fn seed_accounts(db: &DatabaseConnection) {
    let seeds = [
        ("Business Checking", AccountType::Checking, "1000.00", "0"),
        ("Savings", AccountType::Savings, "5000.00", "0"),
        ("Petty Cash", AccountType::Cash, "200.00", "0"),
        ("Brokerage", AccountType::Investment, "0", "9.95"),
    ];

    let now = Utc::now();
    for (name, account_type, balance, fee) in seeds {
        let existing = accounts::Entity::find()
            .filter(accounts::Column::OrganizationId.eq(test_org_id()))
            .filter(accounts::Column::Name.eq(name))
            .one(db)
            .await
            .expect("Failed to query accounts");

        if existing.is_some() {
            continue;
        }

        accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(test_org_id()),
            name: Set(name.to_string()),
            account_type: Set(account_type),
            balance: Set(balance.parse::<Decimal>().unwrap()),
            transaction_fee: Set(fee.parse::<Decimal>().unwrap()),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(db)
        .await
        .expect("Failed to seed account");
    }
}

async fn seed_categories(db: &DatabaseConnection) {
    let names = [
        "Office Supplies",
        "Rent",
        "Utilities",
        "Travel",
        "Client Income",
        "Interest",
        "Uncategorized",
    ];

    let now = Utc::now();
    for name in names {
        let existing = categories::Entity::find()
            .filter(categories::Column::OrganizationId.eq(test_org_id()))
            .filter(categories::Column::Name.eq(name))
            .one(db)
            .await
            .expect("Failed to query categories");

        if existing.is_some() {
            continue;
        }

        categories::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(test_org_id()),
            name: Set(name.to_string()),
            created_at: Set(now.into()),
        }
        .insert(db)
        .await
        .expect("Failed to seed category");
    }
}
