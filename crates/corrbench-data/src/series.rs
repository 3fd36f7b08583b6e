//! Date-indexed price series for a single asset.
//!
//! A [`PriceSeries`] is built once, validated at construction and never mutated
//! afterwards. Returns are derived on demand from the stored observations.

use crate::error::{DataError, LoadError, Result};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Ordered daily price observations for one asset.
///
/// Dates are unique and strictly increasing, every price is finite and
/// strictly positive, and there is at least one observation.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    name: String,
    source: Option<PathBuf>,
    observations: BTreeMap<NaiveDate, f64>,
}

impl PriceSeries {
    /// Build a series from in-memory `(date, price)` pairs.
    ///
    /// Input order is irrelevant; observations are stored ascending by date.
    ///
    /// # Errors
    /// Returns [`LoadError::DuplicateDate`] if a date repeats,
    /// [`LoadError::InvalidPrice`] for a non-finite or non-positive price (its
    /// `line` is the 1-based position in `observations`) and
    /// [`LoadError::Empty`] if no observations are given.
    pub fn new(
        name: impl Into<String>,
        observations: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> std::result::Result<Self, LoadError> {
        let mut map = BTreeMap::new();
        for (idx, (date, price)) in observations.into_iter().enumerate() {
            if !is_valid_price(price) {
                return Err(LoadError::InvalidPrice {
                    line: idx as u64 + 1,
                    value: price.to_string(),
                });
            }
            if map.insert(date, price).is_some() {
                return Err(LoadError::DuplicateDate(date));
            }
        }

        if map.is_empty() {
            return Err(LoadError::Empty);
        }

        Ok(Self {
            name: name.into(),
            source: None,
            observations: map,
        })
    }

    /// Record the file this series was loaded from.
    pub(crate) fn with_source(mut self, path: &Path) -> Self {
        self.source = Some(path.to_path_buf());
        self
    }

    /// Asset name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the file the series was loaded from, if any.
    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Number of observations (always at least one).
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always `false`; an empty series cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Earliest observation date.
    pub fn first_date(&self) -> NaiveDate {
        // Non-empty by construction.
        self.observations
            .keys()
            .next()
            .copied()
            .unwrap_or(NaiveDate::MIN)
    }

    /// Latest observation date.
    pub fn last_date(&self) -> NaiveDate {
        self.observations
            .keys()
            .next_back()
            .copied()
            .unwrap_or(NaiveDate::MAX)
    }

    /// Observation dates in ascending order.
    pub fn dates(&self) -> impl ExactSizeIterator<Item = NaiveDate> + '_ {
        self.observations.keys().copied()
    }

    /// Prices in date order.
    pub fn prices(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.observations.values().copied()
    }

    /// `(date, price)` pairs in date order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (NaiveDate, f64)> + '_ {
        self.observations.iter().map(|(d, p)| (*d, *p))
    }

    /// Whether an observation exists for `date`.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.observations.contains_key(&date)
    }

    /// Price on an exact calendar date.
    ///
    /// There is no interpolation or nearest-date fallback.
    ///
    /// # Errors
    /// Returns [`DataError::DateNotFound`] when the date is absent.
    pub fn price_on(&self, date: NaiveDate) -> Result<f64> {
        self.observations
            .get(&date)
            .copied()
            .ok_or_else(|| DataError::DateNotFound {
                name: self.name.clone(),
                date,
            })
    }

    /// Simple daily returns `p[t] / p[t-1] - 1`.
    ///
    /// The result is one element shorter than the series; a single-observation
    /// series has no returns.
    pub fn daily_returns(&self) -> Vec<f64> {
        self.dated_returns().into_iter().map(|(_, r)| r).collect()
    }

    /// Daily returns labelled with the later date of each consecutive pair.
    pub fn dated_returns(&self) -> Vec<(NaiveDate, f64)> {
        self.iter()
            .zip(self.iter().skip(1))
            .map(|((_, prev), (date, curr))| (date, curr / prev - 1.0))
            .collect()
    }
}

pub(crate) fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn equities() -> PriceSeries {
        PriceSeries::new(
            "Equities",
            vec![
                (date(2024, 1, 2), 100.0),
                (date(2024, 1, 3), 102.0),
                (date(2024, 1, 4), 101.0),
                (date(2024, 1, 5), 105.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_observations_sorted_by_date() {
        let series = PriceSeries::new(
            "X",
            vec![
                (date(2024, 1, 5), 3.0),
                (date(2024, 1, 2), 1.0),
                (date(2024, 1, 3), 2.0),
            ],
        )
        .unwrap();

        let dates: Vec<_> = series.dates().collect();
        assert_eq!(dates, vec![date(2024, 1, 2), date(2024, 1, 3), date(2024, 1, 5)]);
        assert_eq!(series.prices().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.first_date(), date(2024, 1, 2));
        assert_eq!(series.last_date(), date(2024, 1, 5));
        assert!(series.source_path().is_none());
    }

    #[test]
    fn test_daily_returns() {
        let series = equities();
        let returns = series.daily_returns();

        assert_eq!(returns.len(), series.len() - 1);
        assert_abs_diff_eq!(returns[0], 102.0 / 100.0 - 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(returns[1], 101.0 / 102.0 - 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(returns[2], 105.0 / 101.0 - 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_dated_returns_use_later_date() {
        let returns = equities().dated_returns();
        assert_eq!(returns[0].0, date(2024, 1, 3));
        assert_eq!(returns[2].0, date(2024, 1, 5));
    }

    #[test]
    fn test_single_observation_has_no_returns() {
        let series = PriceSeries::new("X", vec![(date(2024, 1, 2), 10.0)]).unwrap();
        assert!(series.daily_returns().is_empty());
        assert!(!series.is_empty());
    }

    #[test]
    fn test_price_on_exact_match_only() {
        let series = equities();
        assert_eq!(series.price_on(date(2024, 1, 4)).unwrap(), 101.0);

        // Weekend between observations: no nearest-date fallback
        let err = series.price_on(date(2024, 1, 6)).unwrap_err();
        assert!(matches!(err, DataError::DateNotFound { ref name, .. } if name == "Equities"));
    }

    #[test]
    fn test_empty_series_rejected() {
        let err = PriceSeries::new("X", Vec::new()).unwrap_err();
        assert!(matches!(err, LoadError::Empty));
    }

    #[test]
    fn test_duplicate_date_rejected() {
        let err = PriceSeries::new("X", vec![(date(2024, 1, 2), 1.0), (date(2024, 1, 2), 2.0)])
            .unwrap_err();
        assert!(matches!(err, LoadError::DuplicateDate(d) if d == date(2024, 1, 2)));
    }

    #[test]
    fn test_invalid_prices_rejected() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = PriceSeries::new("X", vec![(date(2024, 1, 2), bad)]).unwrap_err();
            assert!(matches!(err, LoadError::InvalidPrice { line: 1, .. }));
        }
    }

    #[test]
    fn test_invalid_price_reports_observation_position() {
        let err = PriceSeries::new(
            "X",
            vec![
                (date(2024, 1, 2), 1.0),
                (date(2024, 1, 3), 1.1),
                (date(2024, 1, 4), -1.0),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::InvalidPrice { line: 3, ref value } if value == "-1"));
    }
}
