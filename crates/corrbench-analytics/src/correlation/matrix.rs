//! Correlation matrix indexed by asset name.

use super::CorrelationBasis;
use ndarray::{Array2, ArrayView1};

/// Square, symmetric matrix of pairwise correlations.
///
/// Rows and columns share the same asset order. The diagonal is 1.0 except
/// for zero-variance assets, whose whole row and column are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    assets: Vec<String>,
    values: Array2<f64>,
    observations: usize,
    basis: CorrelationBasis,
    undefined: Vec<String>,
}

impl CorrelationMatrix {
    pub(crate) const fn new(
        assets: Vec<String>,
        values: Array2<f64>,
        observations: usize,
        basis: CorrelationBasis,
        undefined: Vec<String>,
    ) -> Self {
        Self {
            assets,
            values,
            observations,
            basis,
            undefined,
        }
    }

    /// Asset names, in row/column order
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Raw N x N matrix
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of observations each coefficient was computed from
    pub const fn observations(&self) -> usize {
        self.observations
    }

    /// Quantity that was correlated
    pub const fn basis(&self) -> CorrelationBasis {
        self.basis
    }

    /// Assets with zero variance, for which correlation is undefined
    pub fn undefined_assets(&self) -> &[String] {
        &self.undefined
    }

    /// Number of assets
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the matrix has no assets
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Row/column index of an asset
    pub fn index_of(&self, asset: &str) -> Option<usize> {
        self.assets.iter().position(|a| a == asset)
    }

    /// Correlation between two assets
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        Some(self.values[[self.index_of(a)?, self.index_of(b)?]])
    }

    /// Correlations of one asset with every asset
    pub fn row(&self, asset: &str) -> Option<ArrayView1<'_, f64>> {
        self.index_of(asset).map(|i| self.values.row(i))
    }

    /// Check `M[i][j] == M[j][i]` within `tolerance`, treating paired `NaN`s
    /// as equal
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        let n = self.len();
        (0..n).all(|i| {
            (0..n).all(|j| {
                let (x, y) = (self.values[[i, j]], self.values[[j, i]]);
                (x.is_nan() && y.is_nan()) || (x - y).abs() <= tolerance
            })
        })
    }

    /// Every unordered pair of distinct assets with its correlation
    pub fn off_diagonal_pairs(&self) -> Vec<(&str, &str, f64)> {
        let n = self.len();
        let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                pairs.push((
                    self.assets[i].as_str(),
                    self.assets[j].as_str(),
                    self.values[[i, j]],
                ));
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> CorrelationMatrix {
        let values =
            Array2::from_shape_vec((3, 3), vec![1.0, 0.5, -0.2, 0.5, 1.0, 0.1, -0.2, 0.1, 1.0])
                .unwrap();
        CorrelationMatrix::new(
            vec!["A".into(), "B".into(), "C".into()],
            values,
            10,
            CorrelationBasis::Returns,
            Vec::new(),
        )
    }

    #[test]
    fn test_lookup_by_name() {
        let m = matrix();
        assert_eq!(m.get("A", "C"), Some(-0.2));
        assert_eq!(m.get("C", "B"), Some(0.1));
        assert_eq!(m.get("A", "Z"), None);
        assert_eq!(m.row("B").unwrap().to_vec(), vec![0.5, 1.0, 0.1]);
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn test_off_diagonal_pairs() {
        let m = matrix();
        let pairs = m.off_diagonal_pairs();
        assert_eq!(pairs, vec![("A", "B", 0.5), ("A", "C", -0.2), ("B", "C", 0.1)]);
    }

    #[test]
    fn test_symmetry_check() {
        let mut m = matrix();
        assert!(m.is_symmetric(0.0));

        m.values[[0, 1]] = f64::NAN;
        assert!(!m.is_symmetric(1e-9));
        m.values[[1, 0]] = f64::NAN;
        assert!(m.is_symmetric(1e-9));
    }
}
