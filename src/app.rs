//! Application context - the handles every operation needs, built once at startup.
//!
//! The database connection, configuration, and spreadsheet source are constructed by
//! the process entry point and passed in here; nothing in the crate reaches for
//! global clients.

use crate::{
    auth::{self, IdentityProvider},
    config::AppConfig,
    core::{ledger::TermStats, profile, roster::RosterRecord, transaction},
    entities,
    errors::Result,
    sheets::{self, SpreadsheetInfo, SpreadsheetSource},
};
use chrono::{NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared state for request handlers and background jobs.
#[derive(Clone)]
pub struct AppContext {
    /// Transaction store connection
    pub database: DatabaseConnection,
    /// Loaded configuration
    pub config: Arc<AppConfig>,
    /// Roster spreadsheet backend
    pub sheets: Arc<dyn SpreadsheetSource>,
}

impl AppContext {
    /// Creates a context from already-initialized handles.
    #[must_use]
    pub fn new(
        database: DatabaseConnection,
        config: Arc<AppConfig>,
        sheets: Arc<dyn SpreadsheetSource>,
    ) -> Self {
        Self {
            database,
            config,
            sheets,
        }
    }

    /// Term statistics, using the configured term start when none is given.
    pub async fn term_stats(&self, term_start: Option<NaiveDate>) -> Result<TermStats> {
        let today = Utc::now().date_naive();
        transaction::get_term_stats(&self.database, term_start, &self.config.term, today).await
    }

    /// Profile of the user making a request.
    ///
    /// # Arguments
    /// * `provider` - Identity provider that validates the bearer token
    /// * `authorization` - Raw `Authorization` header value, if present
    ///
    /// # Errors
    /// Returns [`crate::errors::Error::Unauthorized`] when the credentials are
    /// missing or rejected, and [`crate::errors::Error::ProfileNotFound`] when the
    /// authenticated user has no profile.
    pub async fn current_profile<P>(
        &self,
        provider: &P,
        authorization: Option<&str>,
    ) -> Result<entities::profile::Model>
    where
        P: IdentityProvider + ?Sized,
    {
        let user = auth::authenticate(provider, authorization).await?;
        profile::get_profile(&self.database, &user.id).await
    }

    /// One roster spreadsheet, mapped.
    pub async fn spreadsheet(&self, id_or_url: &str) -> Result<SpreadsheetInfo> {
        sheets::fetch_spreadsheet_info(self.sheets.as_ref(), id_or_url).await
    }

    /// All configured roster spreadsheets, concatenated. Failing sheets are skipped.
    pub async fn configured_roster(&self) -> Vec<RosterRecord> {
        sheets::fetch_multiple_spreadsheets(self.sheets.as_ref(), &self.config.sheets.spreadsheet_ids)
            .await
    }
}
