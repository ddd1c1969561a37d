//! Ledger aggregation - term statistics over a snapshot of transactions.
//!
//! Everything here is a pure function of the records passed in. The current balance
//! is taken from the stored `balance` snapshot of the newest record; it is never
//! derived by summing amounts. Term figures only look at records dated on or after
//! the term start, while the balance and count always cover the whole ledger.
//!
//! Sums are kept in `i128`, which holds the total of up to 2^63 `i64` amounts, so the
//! aggregation cannot overflow.

use crate::entities::transaction;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::cmp::Ordering;

/// Income, expense, and balance figures for one academic term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermStats {
    /// Balance snapshot of the newest transaction in the whole ledger
    pub total_balance: i128,
    /// Sum of positive amounts within the term
    pub term_income: i128,
    /// Sum of absolute negative amounts within the term
    pub term_expense: i128,
    /// `term_income - term_expense`
    pub term_profit: i128,
    /// Balance implied immediately before the term began
    pub previous_balance: i128,
    /// Number of transactions in the whole ledger
    pub total_transaction_count: usize,
    /// Newest transaction date within the term, if any
    pub latest_transaction_date: Option<DateTime<Utc>>,
}

/// Orders records oldest to newest by `(transaction_date, created_at, id)`.
///
/// The id comparison only matters for exact timestamp ties and keeps the choice
/// of "newest" record reproducible.
#[must_use]
pub fn ledger_order(a: &transaction::Model, b: &transaction::Model) -> Ordering {
    a.transaction_date
        .cmp(&b.transaction_date)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Returns the newest record in ledger order, or `None` for an empty ledger.
#[must_use]
pub fn latest_record(records: &[transaction::Model]) -> Option<&transaction::Model> {
    records.iter().max_by(|a, b| ledger_order(a, b))
}

/// Whether a record falls inside the term beginning at `term_start` (inclusive).
#[must_use]
pub fn in_term(record: &transaction::Model, term_start: NaiveDate) -> bool {
    record.transaction_date.date_naive() >= term_start
}

/// Computes [`TermStats`] for the term starting at `term_start`.
///
/// `records` is the full, unordered ledger. An empty ledger yields all-zero
/// figures and no latest date.
#[must_use]
pub fn compute_stats(records: &[transaction::Model], term_start: NaiveDate) -> TermStats {
    let total_balance = latest_record(records).map_or(0, |r| i128::from(r.balance));

    let mut term_income = 0_i128;
    let mut term_expense = 0_i128;
    let mut latest_transaction_date: Option<DateTime<Utc>> = None;

    for record in records.iter().filter(|r| in_term(r, term_start)) {
        match record.amount.cmp(&0) {
            Ordering::Greater => term_income += i128::from(record.amount),
            Ordering::Less => term_expense += i128::from(record.amount.unsigned_abs()),
            Ordering::Equal => {}
        }
        latest_transaction_date = latest_transaction_date.max(Some(record.transaction_date));
    }

    let term_profit = term_income - term_expense;

    TermStats {
        total_balance,
        term_income,
        term_expense,
        term_profit,
        previous_balance: total_balance - term_profit,
        total_transaction_count: records.len(),
        latest_transaction_date,
    }
}
