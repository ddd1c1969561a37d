//! Transaction store operations - CRUD, search, and term statistics over the ledger table.
//!
//! Every function takes the process-wide `DatabaseConnection` explicitly; nothing here
//! holds global state. Listings are ordered newest first by `(transaction_date, created_at, id)`,
//! matching the order the ledger aggregator uses to pick the current balance.

use crate::{
    config::TermConfig,
    core::ledger::{TermStats, compute_stats},
    entities::{Transaction, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    Condition, PaginatorTrait, QueryOrder, QuerySelect, Set,
    prelude::*,
    sea_query::{Expr, Func},
};
use tracing::{debug, info, instrument};

const DEFAULT_PAGE_SIZE: u64 = 100;

/// Fields supplied when recording a new transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// When the transaction happened
    pub transaction_date: DateTime<Utc>,
    /// Counterparty or bank description
    pub description: String,
    /// Bank transaction type
    pub transaction_type: Option<String>,
    /// Bank or institution name
    pub institution: Option<String>,
    /// Account number
    pub account_number: Option<String>,
    /// Signed amount in whole currency units
    pub amount: i64,
    /// Running balance snapshot reported by the bank
    pub balance: i64,
    /// Free-form memo
    pub memo: Option<String>,
    /// Source file name
    pub file_name: Option<String>,
}

/// Replacement values for an existing transaction. The date and source file are immutable.
#[derive(Debug, Clone)]
pub struct TransactionUpdate {
    /// Counterparty or bank description
    pub description: String,
    /// Bank transaction type
    pub transaction_type: Option<String>,
    /// Bank or institution name
    pub institution: Option<String>,
    /// Account number
    pub account_number: Option<String>,
    /// Signed amount in whole currency units
    pub amount: i64,
    /// Running balance snapshot
    pub balance: i64,
    /// Free-form memo
    pub memo: Option<String>,
}

/// Filters and paging for [`list_transactions`].
#[derive(Debug, Clone)]
pub struct TransactionQuery {
    /// Maximum rows returned
    pub limit: u64,
    /// Rows skipped before the first returned row
    pub offset: u64,
    /// Case-insensitive substring matched against description, memo, or type
    pub search: Option<String>,
    /// First calendar day included (UTC)
    pub start_date: Option<NaiveDate>,
    /// Last calendar day included (UTC)
    pub end_date: Option<NaiveDate>,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
            search: None,
            start_date: None,
            end_date: None,
        }
    }
}

impl TransactionQuery {
    fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(Error::invalid_input("limit must be greater than zero"));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(Error::invalid_input(format!(
                    "start_date {start} is after end_date {end}"
                )));
            }
        }
        Ok(())
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Builds the `LIKE` pattern for a case-insensitive substring search.
///
/// SQLite's `lower()` only folds ASCII letters, so the term is folded the same way.
/// Non-ASCII letters therefore match case-sensitively.
pub(crate) fn like_pattern(search: &str) -> String {
    format!("%{}%", search.to_ascii_lowercase())
}

fn search_condition(search: &str) -> Condition {
    let pattern = like_pattern(search);
    let lowered_like = |column: transaction::Column| {
        Expr::expr(Func::lower(Expr::col(column))).like(pattern.clone())
    };

    Condition::any()
        .add(lowered_like(transaction::Column::Description))
        .add(lowered_like(transaction::Column::Memo))
        .add(lowered_like(transaction::Column::TransactionType))
}

/// Records a new transaction.
///
/// The upload, creation, and modification timestamps are all stamped with the
/// current time; the caller supplies everything else, including the bank's balance
/// snapshot, which is stored as given and never recomputed.
///
/// # Arguments
/// * `db` - Database connection
/// * `new` - Fields of the transaction to record
///
/// # Returns
/// The stored row, including its assigned id.
///
/// # Errors
/// Returns [`Error::Database`] if the insert fails.
#[instrument(skip(db, new), fields(amount = new.amount))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    new: NewTransaction,
) -> Result<transaction::Model> {
    let now = Utc::now();
    let model = transaction::ActiveModel {
        transaction_date: Set(new.transaction_date),
        description: Set(new.description),
        transaction_type: Set(new.transaction_type),
        institution: Set(new.institution),
        account_number: Set(new.account_number),
        amount: Set(new.amount),
        balance: Set(new.balance),
        memo: Set(new.memo),
        file_name: Set(new.file_name),
        uploaded_at: Set(now),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    debug!("Created transaction {}", created.id);
    Ok(created)
}

/// Retrieves a transaction by id, returning `None` when it does not exist.
pub async fn get_transaction_by_id(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<Option<transaction::Model>> {
    Transaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns every transaction in the store, unordered.
pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<transaction::Model>> {
    Transaction::find().all(db).await.map_err(Into::into)
}

/// Counts stored transactions. Doubles as a connectivity check for the store.
pub async fn count_transactions(db: &DatabaseConnection) -> Result<u64> {
    Transaction::find().count(db).await.map_err(Into::into)
}

/// Lists transactions newest first with optional search and inclusive date range.
///
/// Rows are ordered by `(transaction_date, created_at, id)` descending, then
/// `offset` rows are skipped and at most `limit` rows returned. The search term is
/// matched case-insensitively (ASCII only) as a substring of the description, memo,
/// or transaction type. The date range covers whole UTC days: `end_date` includes
/// everything before midnight of the following day.
///
/// # Arguments
/// * `db` - Database connection
/// * `query` - Paging, search term, and date range
///
/// # Errors
/// Returns [`Error::InvalidInput`] if `limit` is zero or `start_date` is after
/// `end_date`, and [`Error::Database`] if the query fails.
#[instrument(skip(db))]
pub async fn list_transactions(
    db: &DatabaseConnection,
    query: &TransactionQuery,
) -> Result<Vec<transaction::Model>> {
    query.validate()?;

    let mut select = Transaction::find();

    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        select = select.filter(search_condition(search));
    }
    if let Some(start) = query.start_date {
        select = select.filter(transaction::Column::TransactionDate.gte(start_of_day(start)));
    }
    if let Some(end) = query.end_date {
        let next_day = end
            .succ_opt()
            .ok_or_else(|| Error::invalid_input(format!("end_date {end} is out of range")))?;
        select = select.filter(transaction::Column::TransactionDate.lt(start_of_day(next_day)));
    }

    select
        .order_by_desc(transaction::Column::TransactionDate)
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id)
        .offset(query.offset)
        .limit(query.limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Replaces the editable fields of a transaction and refreshes `updated_at`.
#[instrument(skip(db, update))]
pub async fn update_transaction(
    db: &DatabaseConnection,
    transaction_id: i64,
    update: TransactionUpdate,
) -> Result<transaction::Model> {
    let existing = get_transaction_by_id(db, transaction_id)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;

    let mut active: transaction::ActiveModel = existing.into();
    active.description = Set(update.description);
    active.transaction_type = Set(update.transaction_type);
    active.institution = Set(update.institution);
    active.account_number = Set(update.account_number);
    active.amount = Set(update.amount);
    active.balance = Set(update.balance);
    active.memo = Set(update.memo);
    active.updated_at = Set(Utc::now());

    active.update(db).await.map_err(Into::into)
}

/// Deletes a transaction.
#[instrument(skip(db))]
pub async fn delete_transaction(db: &DatabaseConnection, transaction_id: i64) -> Result<()> {
    let result = Transaction::delete_by_id(transaction_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::TransactionNotFound { id: transaction_id });
    }
    info!("Deleted transaction {transaction_id}");
    Ok(())
}

/// Computes term statistics over the full ledger.
///
/// Every stored transaction is loaded and handed to
/// [`compute_stats`]; the current balance comes from the newest record's
/// balance snapshot while income and expense only count records in the term.
///
/// # Arguments
/// * `db` - Database connection
/// * `term_start` - First day of the term; `None` lets `term` decide
/// * `term` - Term policy used when no start is given
/// * `today` - Reference date for the term policy
///
/// # Errors
/// Returns [`Error::InvalidInput`] if the term policy cannot produce a valid
/// date for `today`'s year, and [`Error::Database`] if loading the ledger fails.
#[instrument(skip(db, term))]
pub async fn get_term_stats(
    db: &DatabaseConnection,
    term_start: Option<NaiveDate>,
    term: &TermConfig,
    today: NaiveDate,
) -> Result<TermStats> {
    let term_start = match term_start {
        Some(date) => date,
        None => term.term_start_for(today)?,
    };

    let records = list_all(db).await?;
    debug!("Aggregating {} transactions from {term_start}", records.len());
    Ok(compute_stats(&records, term_start))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{at, create_test_transaction, create_custom_transaction, setup_test_db};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_transaction() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_transaction(&db, at(2025, 3, 2, 9, 0), 15_000, 15_000).await?;

        let fetched = get_transaction_by_id(&db, created.id).await?.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.amount, 15_000);
        assert_eq!(fetched.created_at, fetched.updated_at);
        assert!(get_transaction_by_id(&db, created.id + 100).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_transactions_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_transaction(&db, at(2025, 3, 1, 9, 0), 100, 100).await?;
        create_test_transaction(&db, at(2025, 3, 3, 9, 0), 100, 300).await?;
        create_test_transaction(&db, at(2025, 3, 2, 9, 0), 100, 200).await?;

        let rows = list_transactions(&db, &TransactionQuery::default()).await?;
        let balances: Vec<i64> = rows.iter().map(|r| r.balance).collect();
        assert_eq!(balances, vec![300, 200, 100]);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_transactions_paging() -> Result<()> {
        let db = setup_test_db().await?;
        for i in 1..=5 {
            create_test_transaction(&db, at(2025, 3, i, 9, 0), 10, i64::from(i) * 10).await?;
        }

        let query = TransactionQuery {
            limit: 2,
            offset: 1,
            ..Default::default()
        };
        let rows = list_transactions(&db, &query).await?;
        let balances: Vec<i64> = rows.iter().map(|r| r.balance).collect();
        assert_eq!(balances, vec![40, 30]);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_transactions_search() -> Result<()> {
        let db = setup_test_db().await?;
        create_custom_transaction(&db, at(2025, 3, 1, 9, 0), "회비 입금", None, None, 20_000)
            .await?;
        create_custom_transaction(&db, at(2025, 3, 2, 9, 0), "Pizza night", None, None, -30_000)
            .await?;
        create_custom_transaction(
            &db,
            at(2025, 3, 3, 9, 0),
            "Card payment",
            Some("MT pizza"),
            Some("card"),
            -5_000,
        )
        .await?;

        let query = TransactionQuery {
            search: Some("PIZZA".to_string()),
            ..Default::default()
        };
        let rows = list_transactions(&db, &query).await?;
        assert_eq!(rows.len(), 2);

        let query = TransactionQuery {
            search: Some("card".to_string()),
            ..Default::default()
        };
        let rows = list_transactions(&db, &query).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].description, "Card payment");

        let query = TransactionQuery {
            search: Some("회비".to_string()),
            ..Default::default()
        };
        assert_eq!(list_transactions(&db, &query).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_folds_ascii_case_only() -> Result<()> {
        let db = setup_test_db().await?;
        create_custom_transaction(&db, at(2025, 3, 1, 9, 0), "ÉCOLE fee", None, None, 1_000)
            .await?;

        let search = |term: &str| TransactionQuery {
            search: Some(term.to_string()),
            ..Default::default()
        };
        assert_eq!(list_transactions(&db, &search("ÉCOLE")).await?.len(), 1);
        assert_eq!(list_transactions(&db, &search("Écol")).await?.len(), 1);
        assert_eq!(list_transactions(&db, &search("FEE")).await?.len(), 1);
        // lower() leaves É alone, so the lowercase accented form does not match
        assert!(list_transactions(&db, &search("école")).await?.is_empty());
        Ok(())
    }

    #[test]
    fn test_like_pattern_keeps_non_ascii() {
        assert_eq!(like_pattern("ÉCOLE Fee"), "%École fee%");
        assert_eq!(like_pattern("회비"), "%회비%");
    }

    #[tokio::test]
    async fn test_list_transactions_inclusive_date_range() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_transaction(&db, at(2025, 2, 28, 23, 59), 1, 1).await?;
        create_test_transaction(&db, at(2025, 3, 1, 0, 0), 1, 2).await?;
        create_test_transaction(&db, at(2025, 3, 31, 23, 59), 1, 3).await?;
        create_test_transaction(&db, at(2025, 4, 1, 0, 0), 1, 4).await?;

        let query = TransactionQuery {
            start_date: Some(day(2025, 3, 1)),
            end_date: Some(day(2025, 3, 31)),
            ..Default::default()
        };
        let rows = list_transactions(&db, &query).await?;
        let balances: Vec<i64> = rows.iter().map(|r| r.balance).collect();
        assert_eq!(balances, vec![3, 2]);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_transactions_rejects_bad_query() -> Result<()> {
        let db = setup_test_db().await?;

        let zero_limit = TransactionQuery {
            limit: 0,
            ..Default::default()
        };
        assert!(matches!(
            list_transactions(&db, &zero_limit).await,
            Err(Error::InvalidInput { .. })
        ));

        let reversed = TransactionQuery {
            start_date: Some(day(2025, 4, 1)),
            end_date: Some(day(2025, 3, 1)),
            ..Default::default()
        };
        assert!(matches!(
            list_transactions(&db, &reversed).await,
            Err(Error::InvalidInput { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_transaction() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_transaction(&db, at(2025, 3, 2, 9, 0), 100, 100).await?;

        let updated = update_transaction(
            &db,
            created.id,
            TransactionUpdate {
                description: "Corrected".to_string(),
                transaction_type: Some("transfer".to_string()),
                institution: None,
                account_number: None,
                amount: 150,
                balance: 150,
                memo: Some("typo fix".to_string()),
            },
        )
        .await?;

        assert_eq!(updated.description, "Corrected");
        assert_eq!(updated.amount, 150);
        assert_eq!(updated.transaction_date, created.transaction_date);
        assert!(updated.updated_at >= created.updated_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_transaction() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_transaction(
            &db,
            42,
            TransactionUpdate {
                description: String::new(),
                transaction_type: None,
                institution: None,
                account_number: None,
                amount: 0,
                balance: 0,
                memo: None,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::TransactionNotFound { id: 42 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_transaction() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_transaction(&db, at(2025, 3, 2, 9, 0), 100, 100).await?;

        delete_transaction(&db, created.id).await?;
        assert_eq!(count_transactions(&db).await?, 0);

        let again = delete_transaction(&db, created.id).await;
        assert!(matches!(again, Err(Error::TransactionNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_term_stats_with_default_term() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_transaction(&db, at(2025, 3, 1, 0, 0), 50_000, 50_000).await?;
        create_test_transaction(&db, at(2025, 3, 15, 0, 0), -20_000, 30_000).await?;
        create_test_transaction(&db, at(2025, 2, 20, 0, 0), 10_000, 10_000).await?;

        let stats =
            get_term_stats(&db, None, &TermConfig::default(), day(2025, 6, 1)).await?;

        assert_eq!(stats.total_balance, 30_000);
        assert_eq!(stats.term_income, 50_000);
        assert_eq!(stats.term_expense, 20_000);
        assert_eq!(stats.term_profit, 30_000);
        assert_eq!(stats.previous_balance, 0);
        assert_eq!(stats.total_transaction_count, 3);
        assert_eq!(stats.latest_transaction_date, Some(at(2025, 3, 15, 0, 0)));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_term_stats_explicit_start() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_transaction(&db, at(2025, 2, 20, 0, 0), 10_000, 10_000).await?;
        create_test_transaction(&db, at(2025, 3, 15, 0, 0), -2_000, 8_000).await?;

        let stats = get_term_stats(
            &db,
            Some(day(2025, 1, 1)),
            &TermConfig::default(),
            day(2025, 6, 1),
        )
        .await?;

        assert_eq!(stats.term_income, 10_000);
        assert_eq!(stats.term_expense, 2_000);
        assert_eq!(stats.previous_balance, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_term_stats_empty_store() -> Result<()> {
        let db = setup_test_db().await?;
        let stats =
            get_term_stats(&db, None, &TermConfig::default(), day(2025, 6, 1)).await?;
        assert_eq!(stats.total_balance, 0);
        assert_eq!(stats.total_transaction_count, 0);
        assert!(stats.latest_transaction_date.is_none());
        Ok(())
    }
}
