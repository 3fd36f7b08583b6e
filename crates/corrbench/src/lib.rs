#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/corrbench/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod benchmark;
pub mod pipeline;

// Re-export main types from sub-crates
pub use corrbench_analytics as analytics;
pub use corrbench_data as data;
pub use corrbench_output as output;

pub use benchmark::{
    Benchmark, BenchmarkConfig, BenchmarkDefinition, BenchmarkError, BenchmarkWarning, Component,
    ComponentDefinition,
};
pub use pipeline::{
    CorrelationReport, PipelineConfig, PipelineError, SkippedFile, correlate_directory,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
