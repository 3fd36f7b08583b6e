#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/corrbench/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod alignment;
pub mod correlation;
pub mod stats;

// Re-export main types
pub use alignment::{AlignedTable, AlignmentError, ReturnTable, SeriesAligner};
pub use correlation::{
    CorrelationBasis, CorrelationConfig, CorrelationEngine, CorrelationError, CorrelationMatrix,
};
