//! CSV price sources.
//!
//! Reads a date column and a price column from delimited text. Column names
//! default to the Bloomberg export layout (`Date`, `PX_LAST`).

use crate::error::{DataError, LoadError, Result};
use crate::series::{PriceSeries, is_valid_price};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Configuration for reading price series from CSV files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvConfig {
    /// Header of the date column (default: `Date`)
    pub date_column: String,
    /// Header of the price column (default: `PX_LAST`)
    pub price_column: String,
    /// `chrono` formats tried in order when parsing dates
    pub date_formats: Vec<String>,
    /// Field delimiter (default: `,`)
    pub delimiter: u8,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            date_column: "Date".to_string(),
            price_column: "PX_LAST".to_string(),
            date_formats: vec![
                "%Y-%m-%d".to_string(),
                "%m/%d/%Y".to_string(),
                "%Y/%m/%d".to_string(),
                "%d.%m.%Y".to_string(),
            ],
            delimiter: b',',
        }
    }
}

impl CsvConfig {
    /// Parse a date cell, ignoring any time-of-day suffix.
    pub fn parse_date(&self, raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        let day = raw.split(['T', ' ']).next().unwrap_or(raw);
        self.date_formats.iter().find_map(|fmt| {
            NaiveDate::parse_from_str(raw, fmt)
                .or_else(|_| NaiveDate::parse_from_str(day, fmt))
                .ok()
        })
    }
}

/// Source of named price series.
///
/// Implemented by [`CsvSeriesLoader`]; consumers such as benchmarks and the
/// directory pipeline only depend on this trait.
pub trait SeriesLoader {
    /// Load the series stored at `path`, naming it `name`.
    ///
    /// # Errors
    /// Returns [`DataError::Load`] when the source cannot produce a valid series.
    fn load(&self, name: &str, path: &Path) -> Result<PriceSeries>;
}

/// Loads price series from CSV files
#[derive(Debug, Clone, Default)]
pub struct CsvSeriesLoader {
    config: CsvConfig,
}

impl CsvSeriesLoader {
    /// Create a loader with the given configuration
    pub const fn new(config: CsvConfig) -> Self {
        Self { config }
    }

    /// Get the loader configuration
    pub const fn config(&self) -> &CsvConfig {
        &self.config
    }
}

impl SeriesLoader for CsvSeriesLoader {
    fn load(&self, name: &str, path: &Path) -> Result<PriceSeries> {
        PriceSeries::from_csv_path(name, path, &self.config)
    }
}

impl PriceSeries {
    /// Load a series from a CSV file.
    ///
    /// # Errors
    /// Returns [`DataError::Load`] if the file is unreadable, lacks the
    /// configured columns, contains malformed rows or has no usable rows.
    pub fn from_csv_path(name: &str, path: &Path, config: &CsvConfig) -> Result<Self> {
        let file = File::open(path).map_err(|e| DataError::load(name, path, e.into()))?;
        let series = Self::from_reader(name, file, config)
            .map_err(|e| DataError::load(name, path, e))?
            .with_source(path);

        debug!(
            name,
            path = %path.display(),
            observations = series.len(),
            first = %series.first_date(),
            last = %series.last_date(),
            "Loaded price series"
        );

        Ok(series)
    }

    /// Parse a series from any CSV byte stream.
    ///
    /// # Errors
    /// See [`PriceSeries::from_csv_path`].
    pub fn from_reader<R: Read>(
        name: &str,
        reader: R,
        config: &CsvConfig,
    ) -> std::result::Result<Self, LoadError> {
        let observations = read_observations(reader, config)?;
        Self::new(name, observations)
    }
}

/// Read `(date, price)` rows from CSV, in file order.
///
/// Rows whose price cell is blank are skipped. Any other malformed cell fails
/// the whole read.
pub fn read_observations<R: Read>(
    reader: R,
    config: &CsvConfig,
) -> std::result::Result<Vec<(NaiveDate, f64)>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let date_idx = column_index(&headers, &config.date_column)?;
    let price_idx = column_index(&headers, &config.price_column)?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let raw_date = record.get(date_idx).unwrap_or_default();
        let raw_price = record.get(price_idx).unwrap_or_default();

        if raw_price.is_empty() {
            skipped += 1;
            continue;
        }

        let date = config
            .parse_date(raw_date)
            .ok_or_else(|| LoadError::InvalidDate {
                line,
                value: raw_date.to_string(),
            })?;

        let price = raw_price
            .parse::<f64>()
            .ok()
            .filter(|p| is_valid_price(*p))
            .ok_or_else(|| LoadError::InvalidPrice {
                line,
                value: raw_price.to_string(),
            })?;

        rows.push((date, price));
    }

    if skipped > 0 {
        debug!(skipped, "Skipped rows with a blank price");
    }

    Ok(rows)
}

fn column_index(
    headers: &csv::StringRecord,
    column: &str,
) -> std::result::Result<usize, LoadError> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == column)
        .ok_or_else(|| LoadError::MissingColumn(column.to_string()))
}
