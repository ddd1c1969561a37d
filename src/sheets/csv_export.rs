//! Spreadsheet source backed by CSV exports on disk.
//!
//! Each spreadsheet is expected at `<export_dir>/<spreadsheet-id>.csv` with the form
//! questions as the header row. Rows shorter than the header (trailing empty cells
//! dropped by the exporter) simply lack the missing columns.

use super::SpreadsheetSource;
use crate::{
    core::roster::RawRow,
    errors::{Error, Result},
};
use async_trait::async_trait;
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Reads spreadsheet exports from a directory.
#[derive(Debug, Clone)]
pub struct CsvExportSource {
    export_dir: PathBuf,
}

impl CsvExportSource {
    /// Creates a source reading from `export_dir`.
    #[must_use]
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
        }
    }

    /// Path of the export file for a spreadsheet id.
    ///
    /// Ids are restricted to the characters spreadsheet ids actually use so an id can
    /// never point outside the export directory.
    pub fn export_path(&self, spreadsheet_id: &str) -> Result<PathBuf> {
        let valid = !spreadsheet_id.is_empty()
            && spreadsheet_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::invalid_input(format!(
                "'{spreadsheet_id}' is not a valid spreadsheet id"
            )));
        }
        Ok(self.export_dir.join(format!("{spreadsheet_id}.csv")))
    }
}

/// Reads every data row of a CSV export, keyed by header.
pub fn read_rows(path: &Path) -> Result<Vec<RawRow>> {
    let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, value)| (header.clone(), value.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

#[async_trait]
impl SpreadsheetSource for CsvExportSource {
    async fn fetch_rows(&self, spreadsheet_id: &str) -> Result<Vec<RawRow>> {
        let path = self.export_path(spreadsheet_id)?;
        debug!("Reading spreadsheet export {path:?}");

        let source_id = spreadsheet_id.to_string();
        tokio::task::spawn_blocking(move || read_rows(&path))
            .await
            .map_err(|e| Error::SourceFetch {
                source_id,
                message: format!("reader task failed: {e}"),
            })?
    }

    async fn check_connection(&self) -> bool {
        if self.export_dir.is_dir() {
            true
        } else {
            error!("Export directory {:?} is not available", self.export_dir);
            false
        }
    }
}
