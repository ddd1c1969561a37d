//! Transaction entity - One row of the club ledger as recorded by the bank export.
//!
//! `amount` is signed in whole currency units (positive = inflow, negative = outflow).
//! `balance` is the running balance snapshot reported by the source ledger for this row;
//! it is stored as-is and never recomputed from amounts.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// When the transaction happened
    pub transaction_date: DateTimeUtc,
    /// Counterparty or bank description
    pub description: String,
    /// Bank transaction type (e.g. transfer, card)
    pub transaction_type: Option<String>,
    /// Bank or institution name
    pub institution: Option<String>,
    /// Account number the row belongs to
    pub account_number: Option<String>,
    /// Signed amount in whole currency units
    pub amount: i64,
    /// Running balance as of this transaction, as reported by the source
    pub balance: i64,
    /// Free-form memo
    pub memo: Option<String>,
    /// Name of the file the row was imported from
    pub file_name: Option<String>,
    /// When the source file was uploaded
    pub uploaded_at: DateTimeUtc,
    /// When the row was inserted
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

/// Transactions are standalone rows
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
