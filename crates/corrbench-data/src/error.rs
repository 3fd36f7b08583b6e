//! Error types for data operations.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// A price series could not be loaded from its source
    #[error("Failed to load series '{name}' from {}: {source}", path.display())]
    Load {
        /// Name of the series being loaded
        name: String,
        /// Path of the source file
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: LoadError,
    },

    /// No observation exists for the requested date
    #[error("No price for '{name}' on {date}")]
    DateNotFound {
        /// Series that was queried
        name: String,
        /// Requested date
        date: NaiveDate,
    },

    /// The directory contained no candidate price files
    #[error("No .{extension} files found in directory: {}", dir.display())]
    NoSourceFiles {
        /// Directory that was scanned
        dir: PathBuf,
        /// Extension that was searched for
        extension: String,
    },

    /// Every candidate price file in a directory failed to load
    #[error("None of the {failed} price files in {} could be loaded", dir.display())]
    NoLoadableFiles {
        /// Directory that was scanned
        dir: PathBuf,
        /// Number of files that failed
        failed: usize,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a single tabular source fails to produce a price series.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Source could not be opened or read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header
    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    /// A date cell could not be parsed with any configured format
    #[error("Invalid date '{value}' on line {line}")]
    InvalidDate {
        /// 1-based line number in the source
        line: u64,
        /// Offending cell content
        value: String,
    },

    /// A price cell is not a finite, strictly positive number
    #[error("Invalid price '{value}' on line {line}")]
    InvalidPrice {
        /// 1-based line number in the source; for in-memory input, the
        /// 1-based position of the observation
        line: u64,
        /// Offending cell content
        value: String,
    },

    /// The same date appears more than once
    #[error("Duplicate observation for {0}")]
    DuplicateDate(NaiveDate),

    /// No usable rows
    #[error("Source contains no usable observations")]
    Empty,
}

impl DataError {
    /// Wrap a [`LoadError`] with the name and path of the series being loaded.
    pub fn load(name: impl Into<String>, path: impl Into<PathBuf>, source: LoadError) -> Self {
        Self::Load {
            name: name.into(),
            path: path.into(),
            source,
        }
    }
}
