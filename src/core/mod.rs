//! Core business logic - framework-agnostic ledger, roster, and store operations.

/// Term statistics over a ledger snapshot
pub mod ledger;
/// Member profile directory
pub mod profile;
/// Spreadsheet header normalization for the member roster
pub mod roster;
/// Transaction store operations
pub mod transaction;
