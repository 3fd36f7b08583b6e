//! Pearson correlation engine.

use super::{CorrelationBasis, CorrelationError, CorrelationMatrix};
use crate::alignment::AlignedTable;
use crate::stats::{pearson, sample_variance};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Correlation engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// What to correlate (default: returns)
    pub basis: CorrelationBasis,

    /// Minimum number of observations of the chosen basis (default: 2).
    /// With the returns basis this means at least 3 aligned dates.
    pub min_observations: usize,

    /// A standard deviation at or below this is treated as zero variance
    /// (default: 1e-14)
    pub zero_variance_tolerance: f64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            basis: CorrelationBasis::Returns,
            min_observations: 2,
            zero_variance_tolerance: 1e-14,
        }
    }
}

/// Computes correlation matrices from aligned price tables
#[derive(Debug, Clone)]
pub struct CorrelationEngine {
    config: CorrelationConfig,
}

impl CorrelationEngine {
    /// Create a new engine with the given configuration
    pub fn new(config: CorrelationConfig) -> Result<Self, CorrelationError> {
        if config.min_observations < 2 {
            return Err(CorrelationError::InvalidParameter(format!(
                "min_observations must be at least 2, got {}",
                config.min_observations
            )));
        }
        if !(config.zero_variance_tolerance.is_finite() && config.zero_variance_tolerance >= 0.0)
        {
            return Err(CorrelationError::InvalidParameter(format!(
                "zero_variance_tolerance must be finite and non-negative, got {}",
                config.zero_variance_tolerance
            )));
        }
        Ok(Self { config })
    }

    /// Create with default configuration.
    ///
    /// # Errors
    /// Returns an error if the default configuration is invalid (should not happen).
    pub fn try_default() -> Result<Self, CorrelationError> {
        Self::new(CorrelationConfig::default())
    }

    /// Get the engine configuration
    pub const fn config(&self) -> &CorrelationConfig {
        &self.config
    }

    /// Compute the correlation matrix of an aligned table.
    ///
    /// The matrix is recomputed from scratch on every call.
    ///
    /// # Errors
    /// Returns [`CorrelationError::InsufficientData`] when the table yields
    /// fewer than `min_observations` observations of the configured basis.
    pub fn compute(&self, table: &AlignedTable) -> Result<CorrelationMatrix, CorrelationError> {
        let observations = match self.config.basis {
            CorrelationBasis::Returns => table.returns().into_values(),
            CorrelationBasis::Prices => table.prices().to_owned(),
        };

        let n_obs = observations.nrows();
        if n_obs < self.config.min_observations {
            return Err(CorrelationError::InsufficientData {
                required: self.config.min_observations,
                actual: n_obs,
            });
        }

        let (values, degenerate) =
            pearson_matrix(&observations, self.config.zero_variance_tolerance);

        let undefined: Vec<String> = degenerate
            .iter()
            .zip(table.assets())
            .filter(|(d, _)| **d)
            .map(|(_, a)| a.clone())
            .collect();

        debug!(
            assets = table.n_assets(),
            observations = n_obs,
            basis = %self.config.basis,
            undefined = undefined.len(),
            "Computed correlation matrix"
        );

        Ok(CorrelationMatrix::new(
            table.assets().to_vec(),
            values,
            n_obs,
            self.config.basis,
            undefined,
        ))
    }
}

/// Pearson correlation of the columns of `observations` (T x N).
///
/// Returns the N x N matrix and, per column, whether its standard deviation
/// is at or below `tolerance`. Rows and columns of such series are `NaN`,
/// diagonal included.
pub fn pearson_matrix(observations: &Array2<f64>, tolerance: f64) -> (Array2<f64>, Vec<bool>) {
    let columns: Vec<Vec<f64>> = observations
        .columns()
        .into_iter()
        .map(|c| c.to_vec())
        .collect();
    let n_assets = columns.len();

    // NaN variance (fewer than two observations) also counts as degenerate
    let degenerate: Vec<bool> = columns
        .iter()
        .map(|c| !(sample_variance(c).sqrt() > tolerance))
        .collect();

    let mut corr = Array2::<f64>::from_elem((n_assets, n_assets), f64::NAN);
    for i in 0..n_assets {
        if degenerate[i] {
            continue;
        }
        corr[[i, i]] = 1.0;
        for j in (i + 1)..n_assets {
            if degenerate[j] {
                continue;
            }
            let r = pearson(&columns[i], &columns[j]);
            corr[[i, j]] = r;
            corr[[j, i]] = r;
        }
    }

    (corr, degenerate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::SeriesAligner;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use corrbench_data::PriceSeries;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn series(name: &str, prices: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::new(
            name,
            prices
                .iter()
                .enumerate()
                .map(|(i, p)| (start + chrono::Days::new(i as u64), *p)),
        )
        .unwrap()
    }

    fn random_walk(name: &str, n: usize, rng: &mut StdRng) -> PriceSeries {
        let mut price = 100.0;
        let prices: Vec<f64> = (0..n)
            .map(|_| {
                price *= 1.0 + rng.gen_range(-0.03..0.03);
                price
            })
            .collect();
        series(name, &prices)
    }

    #[test]
    fn test_config_default() {
        let config = CorrelationConfig::default();
        assert_eq!(config.basis, CorrelationBasis::Returns);
        assert_eq!(config.min_observations, 2);
    }

    #[test]
    fn test_invalid_min_observations() {
        let config = CorrelationConfig {
            min_observations: 1,
            ..Default::default()
        };
        assert!(matches!(
            CorrelationEngine::new(config),
            Err(CorrelationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_invalid_tolerance() {
        let config = CorrelationConfig {
            zero_variance_tolerance: f64::NAN,
            ..Default::default()
        };
        assert!(CorrelationEngine::new(config).is_err());
    }

    #[test]
    fn test_minimum_is_three_aligned_prices() {
        let engine = CorrelationEngine::try_default().unwrap();
        let aligner = SeriesAligner::new();

        let a = series("A", &[100.0, 101.0]);
        let b = series("B", &[50.0, 49.0]);
        let err = engine.compute(&aligner.align([&a, &b]).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            CorrelationError::InsufficientData {
                required: 2,
                actual: 1
            }
        ));

        let a = series("A", &[100.0, 101.0, 103.0]);
        let b = series("B", &[50.0, 49.0, 49.5]);
        let matrix = engine.compute(&aligner.align([&a, &b]).unwrap()).unwrap();
        assert_eq!(matrix.observations(), 2);
    }

    #[test]
    fn test_self_correlation_is_one() {
        let mut rng = StdRng::seed_from_u64(3);
        let a = random_walk("A", 50, &mut rng);
        let copy = PriceSeries::new("A copy", a.iter()).unwrap();

        let table = SeriesAligner::new().align([&a, &copy]).unwrap();
        let matrix = CorrelationEngine::try_default().unwrap().compute(&table).unwrap();

        assert_abs_diff_eq!(matrix.get("A", "A copy").unwrap(), 1.0, epsilon = 1e-12);
        assert!(matrix.undefined_assets().is_empty());
    }

    #[test]
    fn test_zero_variance_flagged_as_nan() {
        let flat = series("Flat", &[10.0, 10.0, 10.0, 10.0]);
        let moving = series("Moving", &[10.0, 11.0, 10.5, 12.0]);

        let table = SeriesAligner::new().align([&flat, &moving]).unwrap();
        let matrix = CorrelationEngine::try_default().unwrap().compute(&table).unwrap();

        assert!(matrix.get("Flat", "Flat").unwrap().is_nan());
        assert!(matrix.get("Flat", "Moving").unwrap().is_nan());
        assert!(matrix.get("Moving", "Flat").unwrap().is_nan());
        assert_eq!(matrix.get("Moving", "Moving"), Some(1.0));
        assert_eq!(matrix.undefined_assets(), &["Flat".to_string()]);
    }

    #[test]
    fn test_constant_growth_is_zero_variance() {
        // Prices grow 1% every day: returns are constant
        let growth = series("Growth", &[100.0, 101.0, 102.01, 103.0301]);
        let other = series("Other", &[1.0, 2.0, 1.5, 1.7]);

        let table = SeriesAligner::new().align([&growth, &other]).unwrap();
        let matrix = CorrelationEngine::try_default().unwrap().compute(&table).unwrap();
        assert_eq!(matrix.undefined_assets(), &["Growth".to_string()]);
    }

    #[test]
    fn test_matches_pairwise_pearson_and_is_symmetric() {
        let mut rng = StdRng::seed_from_u64(42);
        let inputs: Vec<_> = ["A", "B", "C", "D"]
            .iter()
            .map(|n| random_walk(n, 60, &mut rng))
            .collect();

        let table = SeriesAligner::new().align(&inputs).unwrap();
        let returns = table.returns();
        let matrix = CorrelationEngine::try_default().unwrap().compute(&table).unwrap();

        assert!(matrix.is_symmetric(1e-12));
        for a in table.assets() {
            for b in table.assets() {
                let x = returns.column(a).unwrap().to_vec();
                let y = returns.column(b).unwrap().to_vec();
                let value = matrix.get(a, b).unwrap();
                assert_abs_diff_eq!(value, pearson(&x, &y), epsilon = 1e-10);
                assert!((-1.0..=1.0).contains(&value));
            }
        }
    }

    #[test]
    fn test_pearson_matrix_known_columns() {
        // Columns: linear, its mirror image, constant
        let observations = Array2::from_shape_vec(
            (4, 3),
            vec![1.0, 8.0, 5.0, 2.0, 6.0, 5.0, 3.0, 4.0, 5.0, 4.0, 2.0, 5.0],
        )
        .unwrap();

        let (corr, degenerate) = pearson_matrix(&observations, 1e-14);

        assert_eq!(degenerate, vec![false, false, true]);
        assert_abs_diff_eq!(corr[[0, 0]], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(corr[[0, 1]], -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(corr[[1, 0]], -1.0, epsilon = 1e-12);
        assert!(corr[[2, 2]].is_nan());
        assert!(corr[[0, 2]].is_nan());
    }

    #[test]
    fn test_pearson_matrix_single_row_is_degenerate() {
        let observations = Array2::from_shape_vec((1, 2), vec![1.0, 2.0]).unwrap();
        let (corr, degenerate) = pearson_matrix(&observations, 1e-14);
        assert_eq!(degenerate, vec![true, true]);
        assert!(corr.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_price_basis() {
        let a = series("A", &[1.0, 2.0, 3.0]);
        let b = series("B", &[2.0, 4.0, 6.0]);
        let engine = CorrelationEngine::new(CorrelationConfig {
            basis: CorrelationBasis::Prices,
            ..Default::default()
        })
        .unwrap();

        let matrix = engine
            .compute(&SeriesAligner::new().align([&a, &b]).unwrap())
            .unwrap();
        assert_eq!(matrix.basis(), CorrelationBasis::Prices);
        assert_eq!(matrix.observations(), 3);
        assert_abs_diff_eq!(matrix.get("A", "B").unwrap(), 1.0, epsilon = 1e-12);
    }
}
