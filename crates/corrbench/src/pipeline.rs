//! Directory-to-matrix correlation pipeline.
//!
//! Discovers the price files of a directory, loads each one, aligns the
//! series that loaded on their common dates and correlates them. Files that
//! fail to load are reported on the result instead of aborting the run, as
//! long as at least one file loaded.

use chrono::NaiveDate;
use corrbench_analytics::{
    AlignmentError, CorrelationEngine, CorrelationError, CorrelationMatrix, SeriesAligner,
};
use corrbench_data::{DataError, SeriesLoader, load_directory};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Discovery or loading failed
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Loaded series could not be aligned
    #[error("Alignment error: {0}")]
    Alignment(#[from] AlignmentError),

    /// Aligned series could not be correlated
    #[error("Correlation error: {0}")]
    Correlation(#[from] CorrelationError),
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Extension of the price files to pick up (default: `csv`)
    pub extension: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extension: "csv".to_string(),
        }
    }
}

/// A price file that was skipped because it could not be loaded
#[derive(Debug)]
pub struct SkippedFile {
    /// Asset name derived from the file name
    pub name: String,
    /// Path of the file
    pub path: PathBuf,
    /// Why it could not be loaded
    pub error: DataError,
}

/// Result of correlating a directory of price files
#[derive(Debug)]
pub struct CorrelationReport {
    /// Correlation matrix of the loaded assets
    pub matrix: CorrelationMatrix,
    /// Number of dates common to every loaded asset
    pub aligned_rows: usize,
    /// First common date
    pub first_date: NaiveDate,
    /// Last common date
    pub last_date: NaiveDate,
    /// Names of the assets that loaded, in column order
    pub loaded: Vec<String>,
    /// Files that could not be loaded
    pub skipped: Vec<SkippedFile>,
}

/// Correlate every price file in `dir`.
///
/// # Errors
/// * [`PipelineError::Data`] if no file is found or none loads
/// * [`PipelineError::Alignment`] if the loaded series share no date
/// * [`PipelineError::Correlation`] if too few dates are shared
pub fn correlate_directory<L>(
    dir: &Path,
    config: &PipelineConfig,
    loader: &L,
    engine: &CorrelationEngine,
) -> Result<CorrelationReport, PipelineError>
where
    L: SeriesLoader + ?Sized,
{
    let (series, failed) = load_directory(dir, &config.extension, loader)?.into_series()?;

    let skipped: Vec<SkippedFile> = failed
        .into_iter()
        .filter_map(|outcome| match outcome.result {
            Err(error) => Some(SkippedFile {
                name: outcome.name,
                path: outcome.path,
                error,
            }),
            Ok(_) => None,
        })
        .collect();

    if !skipped.is_empty() {
        warn!(
            skipped = skipped.len(),
            loaded = series.len(),
            "Continuing without unreadable price files"
        );
    }

    let table = SeriesAligner::new().align(&series)?;
    let matrix = engine.compute(&table)?;

    info!(
        dir = %dir.display(),
        assets = table.n_assets(),
        rows = table.n_rows(),
        first = %table.first_date(),
        last = %table.last_date(),
        "Correlated price files"
    );

    Ok(CorrelationReport {
        aligned_rows: table.n_rows(),
        first_date: table.first_date(),
        last_date: table.last_date(),
        loaded: table.assets().to_vec(),
        matrix,
        skipped,
    })
}
