//! Shared test utilities for ClubOS.
//!
//! This module provides helpers for setting up test databases and building
//! ledger records and member profiles with sensible defaults.

use crate::{
    core::{
        profile::{self, NewProfile},
        transaction::{self, NewTransaction},
    },
    entities,
    errors::Result,
};
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// UTC timestamp from calendar parts.
///
/// # Panics
/// Panics on an invalid date, which is a bug in the test itself.
#[allow(clippy::unwrap_used)]
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap()
}

/// Builds an in-memory record whose `created_at` equals its transaction date.
pub fn record(
    id: i64,
    transaction_date: DateTime<Utc>,
    amount: i64,
    balance: i64,
) -> entities::transaction::Model {
    record_created_at(id, transaction_date, transaction_date, amount, balance)
}

/// Builds an in-memory record with an explicit `created_at`.
pub fn record_created_at(
    id: i64,
    transaction_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    amount: i64,
    balance: i64,
) -> entities::transaction::Model {
    entities::transaction::Model {
        id,
        transaction_date,
        description: format!("Test transaction {id}"),
        transaction_type: None,
        institution: None,
        account_number: None,
        amount,
        balance,
        memo: None,
        file_name: None,
        uploaded_at: created_at,
        created_at,
        updated_at: created_at,
    }
}

/// Stores a transaction with default descriptive fields.
///
/// # Defaults
/// * `description`: `"Test transaction"`
/// * `transaction_type`, `memo`, `institution`, `account_number`: None
/// * `file_name`: `"test.xlsx"`
pub async fn create_test_transaction(
    db: &DatabaseConnection,
    transaction_date: DateTime<Utc>,
    amount: i64,
    balance: i64,
) -> Result<entities::transaction::Model> {
    store_transaction(db, transaction_date, "Test transaction", None, None, amount, balance).await
}

/// Stores a transaction with custom searchable fields. The balance equals the amount.
pub async fn create_custom_transaction(
    db: &DatabaseConnection,
    transaction_date: DateTime<Utc>,
    description: &str,
    memo: Option<&str>,
    transaction_type: Option<&str>,
    amount: i64,
) -> Result<entities::transaction::Model> {
    store_transaction(db, transaction_date, description, memo, transaction_type, amount, amount)
        .await
}

async fn store_transaction(
    db: &DatabaseConnection,
    transaction_date: DateTime<Utc>,
    description: &str,
    memo: Option<&str>,
    transaction_type: Option<&str>,
    amount: i64,
    balance: i64,
) -> Result<entities::transaction::Model> {
    transaction::create_transaction(
        db,
        NewTransaction {
            transaction_date,
            description: description.to_string(),
            transaction_type: transaction_type.map(str::to_string),
            institution: None,
            account_number: None,
            amount,
            balance,
            memo: memo.map(str::to_string),
            file_name: Some("test.xlsx".to_string()),
        },
    )
    .await
}

/// Stores a member profile.
///
/// # Arguments
/// * `db` - Database connection
/// * `id` - Identity provider user id
/// * `name` - Display name
/// * `department` - Academic department
///
/// # Defaults
/// * `email`: `"<id>@club.example"`
/// * all other fields: None
pub async fn create_test_profile(
    db: &DatabaseConnection,
    id: &str,
    name: &str,
    department: Option<&str>,
) -> Result<entities::profile::Model> {
    profile::create_profile(
        db,
        NewProfile {
            id: id.to_string(),
            name: name.to_string(),
            email: Some(format!("{id}@club.example")),
            department: department.map(str::to_string),
            ..Default::default()
        },
    )
    .await
}
