//! Alignment of price series on a shared calendar.
//!
//! Alignment is an inner join: a date survives only if every input series
//! has an observation on it. Gaps are never filled.

use chrono::NaiveDate;
use corrbench_data::PriceSeries;
use ndarray::{Array2, ArrayView1, s};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during alignment
#[derive(Debug, Error)]
pub enum AlignmentError {
    /// No input series
    #[error("No series supplied for alignment")]
    NoSeries,

    /// Two inputs share a name, so the columns would be ambiguous
    #[error("Duplicate asset name: {0}")]
    DuplicateAsset(String),

    /// The inputs have no date in common
    #[error("Series {} have no dates in common", assets.join(", "))]
    EmptyIntersection {
        /// Names of the series that were aligned
        assets: Vec<String>,
    },
}

/// Inner-joins price series on their common dates
#[derive(Debug, Clone, Copy, Default)]
pub struct SeriesAligner;

impl SeriesAligner {
    /// Create a new aligner
    pub const fn new() -> Self {
        Self
    }

    /// Align series on the intersection of their dates.
    ///
    /// Column order follows input order; rows are ascending by date.
    ///
    /// # Errors
    /// * [`AlignmentError::NoSeries`] if `series` is empty
    /// * [`AlignmentError::DuplicateAsset`] if two series share a name
    /// * [`AlignmentError::EmptyIntersection`] if no date is common to all
    pub fn align<'a, I>(&self, series: I) -> Result<AlignedTable, AlignmentError>
    where
        I: IntoIterator<Item = &'a PriceSeries>,
    {
        let series: Vec<&PriceSeries> = series.into_iter().collect();
        if series.is_empty() {
            return Err(AlignmentError::NoSeries);
        }

        let mut seen = HashSet::new();
        for s in &series {
            if !seen.insert(s.name()) {
                return Err(AlignmentError::DuplicateAsset(s.name().to_string()));
            }
        }

        let assets: Vec<String> = series.iter().map(|s| s.name().to_string()).collect();

        // Walk the shortest series; the intersection cannot be larger.
        let shortest = series
            .iter()
            .min_by_key(|s| s.len())
            .ok_or(AlignmentError::NoSeries)?;
        let common: BTreeSet<NaiveDate> = shortest
            .dates()
            .filter(|d| series.iter().all(|s| s.contains_date(*d)))
            .collect();

        if common.is_empty() {
            return Err(AlignmentError::EmptyIntersection { assets });
        }

        let mut prices = Array2::<f64>::zeros((common.len(), series.len()));
        for (j, s) in series.iter().enumerate() {
            let aligned = s
                .iter()
                .filter(|(d, _)| common.contains(d))
                .map(|(_, p)| p);
            for (i, price) in aligned.enumerate() {
                prices[[i, j]] = price;
            }
            debug!(
                asset = s.name(),
                dropped = s.len() - common.len(),
                "Dropped dates missing from other series"
            );
        }

        debug!(
            assets = assets.len(),
            rows = common.len(),
            "Aligned price series"
        );

        Ok(AlignedTable {
            dates: common.into_iter().collect(),
            assets,
            prices,
        })
    }
}

/// Prices of several assets on their common dates.
///
/// Every column has exactly one value per row and there is at least one row.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTable {
    dates: Vec<NaiveDate>,
    assets: Vec<String>,
    prices: Array2<f64>,
}

impl AlignedTable {
    /// Date axis, ascending
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Asset names in column order
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Prices (rows = dates, columns = assets)
    pub const fn prices(&self) -> &Array2<f64> {
        &self.prices
    }

    /// Number of aligned dates
    pub fn n_rows(&self) -> usize {
        self.dates.len()
    }

    /// Number of assets
    pub fn n_assets(&self) -> usize {
        self.assets.len()
    }

    /// First aligned date
    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    /// Last aligned date
    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    /// Column index of an asset
    pub fn asset_index(&self, asset: &str) -> Option<usize> {
        self.assets.iter().position(|a| a == asset)
    }

    /// Aligned prices of one asset
    pub fn column(&self, asset: &str) -> Option<ArrayView1<'_, f64>> {
        self.asset_index(asset).map(|j| self.prices.column(j))
    }

    /// Aligned price of an asset on a date
    pub fn price(&self, asset: &str, date: NaiveDate) -> Option<f64> {
        let j = self.asset_index(asset)?;
        let i = self.dates.binary_search(&date).ok()?;
        Some(self.prices[[i, j]])
    }

    /// Simple returns between consecutive aligned dates.
    ///
    /// Each return is labelled with the later date of its pair, so the table
    /// has one row fewer than the prices.
    pub fn returns(&self) -> ReturnTable {
        let prev = self.prices.slice(s![..-1, ..]);
        let next = self.prices.slice(s![1.., ..]);
        let values = &next / &prev - 1.0;

        ReturnTable {
            dates: self.dates.iter().skip(1).copied().collect(),
            assets: self.assets.clone(),
            values,
        }
    }
}

/// Returns derived from an [`AlignedTable`]
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnTable {
    dates: Vec<NaiveDate>,
    assets: Vec<String>,
    values: Array2<f64>,
}

impl ReturnTable {
    /// Return dates (the later date of each consecutive pair)
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Asset names in column order
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Returns (rows = dates, columns = assets)
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Consume the table, keeping only the return matrix
    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    /// Number of return observations
    pub fn n_rows(&self) -> usize {
        self.dates.len()
    }

    /// Returns of one asset
    pub fn column(&self, asset: &str) -> Option<ArrayView1<'_, f64>> {
        self.assets
            .iter()
            .position(|a| a == asset)
            .map(|j| self.values.column(j))
    }
}
