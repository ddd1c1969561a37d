//! Spreadsheet ingestion - fetches roster sheets and maps them to canonical records.
//!
//! The spreadsheet backend is an external collaborator behind [`SpreadsheetSource`].
//! Callers may pass either a bare spreadsheet id or a full sheet URL; the id is
//! extracted before the source is asked for rows.

/// Spreadsheet source reading CSV exports from a directory
pub mod csv_export;

pub use csv_export::CsvExportSource;

use crate::{
    core::roster::{self, RawRow, RosterRecord},
    errors::{Error, Result},
};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument, warn};

const URL_ID_MARKER: &str = "spreadsheets/d/";

/// Anything that can return the rows of a spreadsheet's first sheet.
#[async_trait]
pub trait SpreadsheetSource: Send + Sync {
    /// Returns every data row of the spreadsheet, keyed by header text.
    async fn fetch_rows(&self, spreadsheet_id: &str) -> Result<Vec<RawRow>>;

    /// Whether the source is reachable. Never fails; problems are logged.
    async fn check_connection(&self) -> bool;
}

/// A fetched and mapped spreadsheet.
#[derive(Debug, Clone, Serialize)]
pub struct SpreadsheetInfo {
    /// Spreadsheet id the rows came from
    pub spreadsheet_id: String,
    /// Number of data rows
    pub total_rows: usize,
    /// Canonical field names known to the mapper
    pub columns: Vec<&'static str>,
    /// Mapped rows in sheet order
    pub data: Vec<RosterRecord>,
}

/// Extracts the spreadsheet id from a bare id or a `.../spreadsheets/d/<id>/...` URL.
pub fn extract_spreadsheet_id(id_or_url: &str) -> Result<&str> {
    let trimmed = id_or_url.trim();
    let id = match trimmed.split_once(URL_ID_MARKER) {
        Some((_, rest)) => rest.split('/').next().unwrap_or_default(),
        None => trimmed,
    };

    if id.is_empty() {
        return Err(Error::invalid_input(format!(
            "no spreadsheet id in '{id_or_url}'"
        )));
    }
    Ok(id)
}

async fn fetch_roster<S>(source: &S, spreadsheet_id: &str) -> Result<Vec<RosterRecord>>
where
    S: SpreadsheetSource + ?Sized,
{
    let rows = source
        .fetch_rows(spreadsheet_id)
        .await
        .map_err(|e| match e {
            Error::SourceFetch { .. } | Error::InvalidInput { .. } => e,
            other => Error::SourceFetch {
                source_id: spreadsheet_id.to_string(),
                message: other.to_string(),
            },
        })?;
    Ok(roster::map_rows(&rows))
}

/// Fetches one spreadsheet and maps its rows.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] when no usable spreadsheet id can be taken from
/// `id_or_url` or the source rejects the id itself. Any other failure of the source
/// is reported as [`Error::SourceFetch`].
#[instrument(skip(source))]
pub async fn fetch_spreadsheet_info<S>(source: &S, id_or_url: &str) -> Result<SpreadsheetInfo>
where
    S: SpreadsheetSource + ?Sized,
{
    let spreadsheet_id = extract_spreadsheet_id(id_or_url)?;
    let data = fetch_roster(source, spreadsheet_id).await?;
    debug!("Fetched {} rows from spreadsheet {spreadsheet_id}", data.len());

    Ok(SpreadsheetInfo {
        spreadsheet_id: spreadsheet_id.to_string(),
        total_rows: data.len(),
        columns: roster::canonical_fields(),
        data,
    })
}

/// Fetches several spreadsheets and concatenates their mapped rows in input order.
///
/// A source that fails (including an unusable identifier) is logged and skipped;
/// the rows of the remaining sources are still returned.
#[instrument(skip(source, ids_or_urls), fields(sources = ids_or_urls.len()))]
pub async fn fetch_multiple_spreadsheets<S>(source: &S, ids_or_urls: &[String]) -> Vec<RosterRecord>
where
    S: SpreadsheetSource + ?Sized,
{
    let mut all_records = Vec::new();

    for id_or_url in ids_or_urls {
        let result = match extract_spreadsheet_id(id_or_url) {
            Ok(spreadsheet_id) => fetch_roster(source, spreadsheet_id).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(records) => {
                debug!("Fetched {} rows from {id_or_url}", records.len());
                all_records.extend(records);
            }
            Err(e) => warn!("Skipping spreadsheet {id_or_url}: {e}"),
        }
    }

    all_records
}
