//! Unified error types for ClubOS.
//!
//! Every fallible operation in the crate returns [`Result`]. Errors carry an
//! [`ErrorClass`] so a boundary layer can translate them into an HTTP status
//! without inspecting individual variants.

use thiserror::Error;

/// All errors produced by the ClubOS core.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller-supplied input that cannot be processed.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input
        message: String,
    },

    /// A single spreadsheet source could not be fetched.
    #[error("Failed to fetch spreadsheet '{source_id}': {message}")]
    SourceFetch {
        /// Identifier of the failing source
        source_id: String,
        /// Underlying failure
        message: String,
    },

    /// Missing, malformed, or rejected credentials.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Why the credentials were rejected
        message: String,
    },

    /// No transaction exists with the given id.
    #[error("Transaction not found: {id}")]
    TransactionNotFound {
        /// The id that was looked up
        id: i64,
    },

    /// No member profile exists for the given user id.
    #[error("Profile not found: {id}")]
    ProfileNotFound {
        /// The user id that was looked up
        id: String,
    },

    /// Configuration file or value problem.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// Database error from `SeaORM`.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Environment variable error.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Coarse classification of an [`Error`], mirroring HTTP status families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Credentials missing or invalid (401)
    Unauthorized,
    /// Requested resource does not exist (404)
    NotFound,
    /// Request was malformed (400)
    BadRequest,
    /// Anything else (500)
    Internal,
}

impl ErrorClass {
    /// HTTP status code equivalent of this class.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::BadRequest => 400,
            Self::Internal => 500,
        }
    }
}

impl Error {
    /// Classifies this error for a boundary layer.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Unauthorized { .. } => ErrorClass::Unauthorized,
            Self::TransactionNotFound { .. } | Self::ProfileNotFound { .. } => {
                ErrorClass::NotFound
            }
            Self::InvalidInput { .. } => ErrorClass::BadRequest,
            Self::SourceFetch { .. }
            | Self::Config { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::Csv(_)
            | Self::EnvVar(_) => ErrorClass::Internal,
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
