//! Correlation matrix estimation
//!
//! Computes pairwise Pearson correlations from an
//! [`AlignedTable`](crate::alignment::AlignedTable). With the
//! default [`CorrelationBasis::Returns`] the engine derives returns from the
//! aligned prices first, so that every return pairs the same two dates across
//! assets.

pub mod engine;
pub mod matrix;

pub use engine::{CorrelationConfig, CorrelationEngine};
pub use matrix::CorrelationMatrix;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during correlation estimation
#[derive(Debug, Error)]
pub enum CorrelationError {
    /// Insufficient data for estimation
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Quantity that is correlated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationBasis {
    /// Simple returns between consecutive aligned dates
    #[default]
    Returns,
    /// Raw price levels
    Prices,
}

impl CorrelationBasis {
    /// Lowercase name of the basis
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Returns => "returns",
            Self::Prices => "prices",
        }
    }
}

impl fmt::Display for CorrelationBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
