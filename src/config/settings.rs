//! Application settings loaded from config.toml
//!
//! The academic term start and the spreadsheet ingestion sources live here rather
//! than in code. Every section has defaults, so a missing config file still yields
//! a usable configuration.

use crate::errors::{Error, Result};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Academic term policy
    pub term: TermConfig,
    /// Spreadsheet ingestion settings
    pub sheets: SheetsConfig,
}

/// When the academic term begins each year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TermConfig {
    /// Month the term starts in (1-12)
    pub start_month: u32,
    /// Day of month the term starts on
    pub start_day: u32,
}

impl Default for TermConfig {
    fn default() -> Self {
        Self {
            start_month: 3,
            start_day: 1,
        }
    }
}

impl TermConfig {
    /// Checks that the month/day pair exists in at least one calendar year.
    pub fn validate(&self) -> Result<()> {
        // 2024 is a leap year, so Feb 29 passes here
        if NaiveDate::from_ymd_opt(2024, self.start_month, self.start_day).is_none() {
            return Err(Error::Config {
                message: format!(
                    "term start {:02}-{:02} is not a calendar date",
                    self.start_month, self.start_day
                ),
            });
        }
        Ok(())
    }

    /// Term start date within the calendar year of `today`.
    pub fn term_start_for(&self, today: NaiveDate) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(today.year(), self.start_month, self.start_day).ok_or_else(|| {
            Error::invalid_input(format!(
                "term start {:02}-{:02} does not exist in {}",
                self.start_month,
                self.start_day,
                today.year()
            ))
        })
    }
}

/// Where roster spreadsheets come from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// Directory holding `<spreadsheet-id>.csv` exports
    pub export_dir: PathBuf,
    /// Spreadsheet ids or URLs to ingest
    pub spreadsheet_ids: Vec<String>,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("data/sheets"),
            spreadsheet_ids: Vec::new(),
        }
    }
}

/// Parses and validates configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.term.validate()?;
    Ok(config)
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML syntax is invalid, or
/// the term start is not a calendar date.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Loading configuration from: {path_ref:?}");
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;
    parse_config(&contents)
}

/// Loads configuration from `CLUBOS_CONFIG` (default `./config.toml`).
///
/// A missing file is not an error; defaults are used instead.
pub fn load_app_config() -> Result<AppConfig> {
    let path = std::env::var("CLUBOS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        info!("No config file at {path}, using defaults");
        return Ok(AppConfig::default());
    }
    load_config(path)
}
