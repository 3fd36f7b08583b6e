#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/corrbench/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod discovery;
pub mod error;
pub mod series;
pub mod source;

pub use discovery::{DirectoryLoad, LoadOutcome, asset_name, discover_price_files, load_directory};
pub use error::{DataError, LoadError, Result};
pub use series::PriceSeries;
pub use source::{CsvConfig, CsvSeriesLoader, SeriesLoader};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
