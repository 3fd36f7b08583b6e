//! Discovery and batch loading of price files in a directory.
//!
//! Each file found is loaded independently. Failures are kept alongside the
//! successes so the caller decides whether a partial load is acceptable.

use crate::error::{DataError, Result};
use crate::series::PriceSeries;
use crate::source::SeriesLoader;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// List the files in `dir` whose extension matches `extension`
/// (case-insensitive), sorted by path.
///
/// # Errors
/// Returns [`DataError::Io`] if the directory cannot be read and
/// [`DataError::NoSourceFiles`] if nothing matches.
pub fn discover_price_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let extension = extension.trim_start_matches('.');
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if matches && path.is_file() {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(DataError::NoSourceFiles {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
        });
    }

    files.sort();
    debug!(dir = %dir.display(), count = files.len(), "Discovered price files");
    Ok(files)
}

/// Asset name for a price file: its base name without extension.
pub fn asset_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Result of loading one file.
#[derive(Debug)]
pub struct LoadOutcome {
    /// Asset name derived from the file name
    pub name: String,
    /// Path of the file
    pub path: PathBuf,
    /// Loaded series or the reason it failed
    pub result: Result<PriceSeries>,
}

/// Per-file results of loading every price file in a directory.
#[derive(Debug)]
pub struct DirectoryLoad {
    dir: PathBuf,
    outcomes: Vec<LoadOutcome>,
}

impl DirectoryLoad {
    /// Directory that was loaded.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every outcome, in discovery order.
    pub fn outcomes(&self) -> &[LoadOutcome] {
        &self.outcomes
    }

    /// Outcomes that failed.
    pub fn failures(&self) -> impl Iterator<Item = &LoadOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    /// Number of files that loaded successfully.
    pub fn loaded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Split into loaded series and failed outcomes, requiring at least one
    /// success.
    ///
    /// # Errors
    /// Returns [`DataError::NoLoadableFiles`] when every file failed.
    pub fn into_series(self) -> Result<(Vec<PriceSeries>, Vec<LoadOutcome>)> {
        let (succeeded, failed): (Vec<_>, Vec<_>) = self
            .outcomes
            .into_iter()
            .partition(|o| o.result.is_ok());
        let loaded: Vec<PriceSeries> = succeeded
            .into_iter()
            .filter_map(|o| o.result.ok())
            .collect();

        if loaded.is_empty() {
            return Err(DataError::NoLoadableFiles {
                dir: self.dir,
                failed: failed.len(),
            });
        }

        Ok((loaded, failed))
    }
}

/// Discover and load every price file in `dir`.
///
/// # Errors
/// Fails only if discovery fails; individual load failures are returned in
/// the [`DirectoryLoad`].
pub fn load_directory<L>(dir: &Path, extension: &str, loader: &L) -> Result<DirectoryLoad>
where
    L: SeriesLoader + ?Sized,
{
    let files = discover_price_files(dir, extension)?;

    let outcomes = files
        .into_iter()
        .map(|path| {
            let name = asset_name(&path);
            let result = loader.load(&name, &path);
            if let Err(e) = &result {
                warn!(path = %path.display(), error = %e, "Could not read price file");
            }
            LoadOutcome { name, path, result }
        })
        .collect();

    Ok(DirectoryLoad {
        dir: dir.to_path_buf(),
        outcomes,
    })
}
