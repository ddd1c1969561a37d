//! Entity module - Contains the SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod profile;
pub mod transaction;

pub use profile::{Column as ProfileColumn, Entity as Profile, Model as ProfileModel};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
