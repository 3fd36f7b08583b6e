//! Weighted benchmark portfolios.
//!
//! A [`Benchmark`] is a named set of components, each with a non-negative
//! weight and its own price series. Construction loads every component's
//! series and fails as a whole if any of them fails: there is no partially
//! built benchmark.
//!
//! Weights are expected to sum to 1.0. A different sum is accepted (partial
//! benchmarks are a legitimate use) and recorded as a [`BenchmarkWarning`].

use corrbench_analytics::{AlignedTable, AlignmentError, SeriesAligner};
use corrbench_data::{DataError, PriceSeries, SeriesLoader};
use corrbench_output::{BenchmarkSummary, ComponentSummary};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Benchmark errors
#[derive(Debug, Error)]
pub enum BenchmarkError {
    /// No components were defined
    #[error("Benchmark '{0}' must have at least one component")]
    Empty(String),

    /// A component weight is negative, NaN or infinite
    #[error("Component weight must be finite and non-negative: {component} ({weight})")]
    InvalidWeight {
        /// Component name
        component: String,
        /// Offending weight
        weight: f64,
    },

    /// The same component name appears twice
    #[error("Component '{0}' is defined more than once")]
    DuplicateComponent(String),

    /// A component's price series failed to load
    #[error("Failed to initialize component '{component}'")]
    ComponentLoad {
        /// Component name
        component: String,
        /// Load failure
        #[source]
        source: DataError,
    },

    /// Lookup of an unknown component
    #[error("Component '{0}' not found in benchmark")]
    ComponentNotFound(String),

    /// Malformed benchmark definition
    #[error("Invalid benchmark definition: {0}")]
    Definition(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Benchmark configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Absolute tolerance on the weight sum before a warning is recorded
    /// (default: 1e-6)
    pub weight_tolerance: f64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            weight_tolerance: 1e-6,
        }
    }
}

/// Non-fatal findings recorded while building a benchmark
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BenchmarkWarning {
    /// Component weights do not sum to 1.0
    WeightSumMismatch {
        /// Actual sum of weights
        total: f64,
    },
}

impl fmt::Display for BenchmarkWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WeightSumMismatch { total } => {
                write!(f, "component weights sum to {total}, which is not 1.0")
            }
        }
    }
}

/// One component of a benchmark definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    /// Component name, also used as the name of its price series
    pub name: String,
    /// Portfolio weight
    pub weight: f64,
    /// Price file backing the component
    pub source: PathBuf,
}

impl ComponentDefinition {
    /// Create a new component definition
    pub fn new(name: impl Into<String>, weight: f64, source: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            weight,
            source: source.into(),
        }
    }
}

/// Full description of a benchmark, loadable from JSON
///
/// ```json
/// {
///   "name": "Fund X",
///   "components": [
///     { "name": "Equities", "weight": 0.5, "source": "mxwo.csv" },
///     { "name": "Fixed Income", "weight": 0.3, "source": "sbwau.csv" },
///     { "name": "Commodities", "weight": 0.2, "source": "spgsci.csv" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkDefinition {
    /// Benchmark name
    pub name: String,
    /// Components, in definition order
    pub components: Vec<ComponentDefinition>,
}

impl BenchmarkDefinition {
    /// Parse a definition from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, BenchmarkError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a definition from a JSON file.
    ///
    /// Relative component sources are resolved against the directory that
    /// contains the definition file.
    pub fn from_json_path(path: &Path) -> Result<Self, BenchmarkError> {
        let mut definition = Self::from_json_str(&fs::read_to_string(path)?)?;
        if let Some(base) = path.parent() {
            for component in &mut definition.components {
                if component.source.is_relative() {
                    component.source = base.join(&component.source);
                }
            }
        }
        Ok(definition)
    }
}

/// A benchmark component: its weight and price series
#[derive(Debug, Clone)]
pub struct Component {
    weight: f64,
    series: PriceSeries,
}

impl Component {
    /// Component name
    pub fn name(&self) -> &str {
        self.series.name()
    }

    /// Portfolio weight
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// Price series backing the component
    pub const fn series(&self) -> &PriceSeries {
        &self.series
    }
}

/// Weighted benchmark portfolio
#[derive(Debug, Clone)]
pub struct Benchmark {
    name: String,
    components: BTreeMap<String, Component>,
    warnings: Vec<BenchmarkWarning>,
}

impl Benchmark {
    /// Build a benchmark, loading each component's series through `loader`.
    ///
    /// # Errors
    /// * [`BenchmarkError::Empty`] if `definitions` is empty
    /// * [`BenchmarkError::InvalidWeight`] for a negative or non-finite weight
    /// * [`BenchmarkError::DuplicateComponent`] if a name repeats
    /// * [`BenchmarkError::ComponentLoad`] if any series fails to load
    pub fn new<L>(
        name: impl Into<String>,
        definitions: impl IntoIterator<Item = ComponentDefinition>,
        loader: &L,
        config: &BenchmarkConfig,
    ) -> Result<Self, BenchmarkError>
    where
        L: SeriesLoader + ?Sized,
    {
        let name = name.into();
        let definitions: Vec<ComponentDefinition> = definitions.into_iter().collect();

        if definitions.is_empty() {
            return Err(BenchmarkError::Empty(name));
        }

        // Validate all weights before touching any file
        if let Some(bad) = definitions
            .iter()
            .find(|d| !(d.weight.is_finite() && d.weight >= 0.0))
        {
            return Err(BenchmarkError::InvalidWeight {
                component: bad.name.clone(),
                weight: bad.weight,
            });
        }

        info!(
            benchmark = %name,
            components = ?definitions.iter().map(|d| d.name.as_str()).collect::<Vec<_>>(),
            "Creating benchmark"
        );

        let mut components = BTreeMap::new();
        for definition in definitions {
            let entry = match components.entry(definition.name.clone()) {
                Entry::Occupied(_) => {
                    return Err(BenchmarkError::DuplicateComponent(definition.name));
                }
                Entry::Vacant(entry) => entry,
            };

            let series = loader
                .load(&definition.name, &definition.source)
                .map_err(|source| BenchmarkError::ComponentLoad {
                    component: definition.name.clone(),
                    source,
                })?;

            debug!(
                component = %definition.name,
                observations = series.len(),
                "Loaded benchmark component"
            );

            entry.insert(Component {
                weight: definition.weight,
                series,
            });
        }

        let total: f64 = components.values().map(Component::weight).sum();
        let mut warnings = Vec::new();
        if (total - 1.0).abs() > config.weight_tolerance {
            let warning = BenchmarkWarning::WeightSumMismatch { total };
            warn!(benchmark = %name, "{warning}");
            warnings.push(warning);
        }

        info!(benchmark = %name, "Benchmark created");

        Ok(Self {
            name,
            components,
            warnings,
        })
    }

    /// Build a benchmark from a parsed definition.
    pub fn from_definition<L>(
        definition: BenchmarkDefinition,
        loader: &L,
        config: &BenchmarkConfig,
    ) -> Result<Self, BenchmarkError>
    where
        L: SeriesLoader + ?Sized,
    {
        Self::new(definition.name, definition.components, loader, config)
    }

    /// Benchmark name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Always `false`; a benchmark has at least one component
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Component names (sorted; order carries no meaning)
    pub fn component_names(&self) -> Vec<&str> {
        self.components.keys().map(String::as_str).collect()
    }

    /// Components in name order
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Weight of a component
    pub fn weight_of(&self, component: &str) -> Result<f64, BenchmarkError> {
        self.component(component).map(Component::weight)
    }

    /// Price series of a component
    pub fn asset_of(&self, component: &str) -> Result<&PriceSeries, BenchmarkError> {
        self.component(component).map(Component::series)
    }

    fn component(&self, component: &str) -> Result<&Component, BenchmarkError> {
        self.components
            .get(component)
            .ok_or_else(|| BenchmarkError::ComponentNotFound(component.to_string()))
    }

    /// Sum of component weights
    pub fn total_weight(&self) -> f64 {
        self.components.values().map(Component::weight).sum()
    }

    /// Warnings recorded at construction
    pub fn warnings(&self) -> &[BenchmarkWarning] {
        &self.warnings
    }

    /// Whether the weights sum to 1.0 within the configured tolerance
    pub fn is_fully_weighted(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Align the component series on their common dates.
    pub fn align_components(
        &self,
        aligner: &SeriesAligner,
    ) -> Result<AlignedTable, AlignmentError> {
        aligner.align(self.components.values().map(Component::series))
    }

    /// Summary suitable for display or export
    pub fn summary(&self) -> BenchmarkSummary {
        BenchmarkSummary {
            name: self.name.clone(),
            total_weight: self.total_weight(),
            warnings: self.warnings.iter().map(ToString::to_string).collect(),
            components: self
                .components()
                .map(|c| ComponentSummary {
                    name: c.name().to_string(),
                    weight: c.weight(),
                    observations: c.series().len(),
                    first_date: c.series().first_date(),
                    last_date: c.series().last_date(),
                    source: c.series().source_path().map(Path::to_path_buf),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use corrbench_data::LoadError;
    use rstest::rstest;
    use std::collections::HashMap;

    /// Serves in-memory series keyed by source path
    struct MapLoader(HashMap<PathBuf, Vec<f64>>);

    impl SeriesLoader for MapLoader {
        fn load(&self, name: &str, path: &Path) -> corrbench_data::Result<PriceSeries> {
            let prices = self.0.get(path).ok_or_else(|| {
                DataError::load(
                    name,
                    path,
                    LoadError::Io(std::io::Error::from(std::io::ErrorKind::NotFound)),
                )
            })?;
            let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
            PriceSeries::new(
                name,
                prices
                    .iter()
                    .enumerate()
                    .map(|(i, p)| (start + chrono::Days::new(i as u64), *p)),
            )
            .map_err(|e| DataError::load(name, path, e))
        }
    }

    fn loader() -> MapLoader {
        MapLoader(HashMap::from([
            (PathBuf::from("mxwo.csv"), vec![100.0, 102.0, 101.0, 105.0]),
            (PathBuf::from("sbwau.csv"), vec![50.0, 50.5, 50.3, 50.8]),
            (PathBuf::from("spgsci.csv"), vec![80.0, 79.0, 81.0, 82.0]),
        ]))
    }

    fn fund_x() -> Vec<ComponentDefinition> {
        vec![
            ComponentDefinition::new("Equities", 0.5, "mxwo.csv"),
            ComponentDefinition::new("Fixed Income", 0.3, "sbwau.csv"),
            ComponentDefinition::new("Commodities", 0.2, "spgsci.csv"),
        ]
    }

    #[test]
    fn test_stores_properties() {
        let benchmark =
            Benchmark::new("Fund X", fund_x(), &loader(), &BenchmarkConfig::default()).unwrap();

        assert_eq!(benchmark.name(), "Fund X");
        assert_eq!(benchmark.len(), 3);
        assert_eq!(
            benchmark.component_names(),
            vec!["Commodities", "Equities", "Fixed Income"]
        );
        for definition in fund_x() {
            assert_eq!(benchmark.weight_of(&definition.name).unwrap(), definition.weight);
            let asset = benchmark.asset_of(&definition.name).unwrap();
            assert_eq!(asset.name(), definition.name);
            assert_eq!(asset.len(), 4);
        }
    }

    #[test]
    fn test_full_weights_no_warning() {
        let benchmark =
            Benchmark::new("Fund X", fund_x(), &loader(), &BenchmarkConfig::default()).unwrap();
        assert!(benchmark.warnings().is_empty());
        assert!(benchmark.is_fully_weighted());
    }

    #[test]
    fn test_partial_weights_warn() {
        let definitions = fund_x().into_iter().take(2);
        let benchmark =
            Benchmark::new("Partial", definitions, &loader(), &BenchmarkConfig::default())
                .unwrap();

        assert_eq!(benchmark.len(), 2);
        match benchmark.warnings() {
            [BenchmarkWarning::WeightSumMismatch { total }] => {
                approx::assert_abs_diff_eq!(*total, 0.8, epsilon = 1e-12);
            }
            other => panic!("unexpected warnings: {other:?}"),
        }
        assert!(!benchmark.is_fully_weighted());
    }

    #[test]
    fn test_empty_definitions() {
        let err = Benchmark::new("Empty Fund", Vec::new(), &loader(), &BenchmarkConfig::default())
            .unwrap_err();
        assert!(matches!(err, BenchmarkError::Empty(ref n) if n == "Empty Fund"));
        assert!(err.to_string().contains("must have at least one component"));
    }

    #[rstest]
    #[case(-0.3)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn test_invalid_weight(#[case] weight: f64) {
        let mut definitions = fund_x();
        definitions[1].weight = weight;
        let err =
            Benchmark::new("Fund X", definitions, &loader(), &BenchmarkConfig::default())
                .unwrap_err();
        assert!(matches!(
            err,
            BenchmarkError::InvalidWeight { ref component, .. } if component == "Fixed Income"
        ));
        assert!(err.to_string().contains("must be finite and non-negative"));
    }

    #[test]
    fn test_duplicate_component() {
        let mut definitions = fund_x();
        definitions.push(ComponentDefinition::new("Equities", 0.0, "mxwo.csv"));
        let err =
            Benchmark::new("Fund X", definitions, &loader(), &BenchmarkConfig::default())
                .unwrap_err();
        assert!(matches!(err, BenchmarkError::DuplicateComponent(ref n) if n == "Equities"));
    }

    #[test]
    fn test_failed_component_aborts_construction() {
        let mut definitions = fund_x();
        definitions[2].source = PathBuf::from("missing.csv");
        let err =
            Benchmark::new("Fund X", definitions, &loader(), &BenchmarkConfig::default())
                .unwrap_err();

        match err {
            BenchmarkError::ComponentLoad { component, source } => {
                assert_eq!(component, "Commodities");
                assert!(matches!(source, DataError::Load { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_lookup_unknown_component() {
        let benchmark =
            Benchmark::new("Fund X", fund_x(), &loader(), &BenchmarkConfig::default()).unwrap();
        assert!(matches!(
            benchmark.weight_of("Cash"),
            Err(BenchmarkError::ComponentNotFound(_))
        ));
        assert!(matches!(
            benchmark.asset_of("Cash"),
            Err(BenchmarkError::ComponentNotFound(_))
        ));
    }

    #[test]
    fn test_align_components() {
        let benchmark =
            Benchmark::new("Fund X", fund_x(), &loader(), &BenchmarkConfig::default()).unwrap();
        let table = benchmark.align_components(&SeriesAligner::new()).unwrap();
        assert_eq!(table.n_rows(), 4);
        assert_eq!(table.n_assets(), 3);
    }

    #[test]
    fn test_summary() {
        let benchmark =
            Benchmark::new("Fund X", fund_x()[..2].to_vec(), &loader(), &BenchmarkConfig::default())
                .unwrap();
        let summary = benchmark.summary();
        assert_eq!(summary.name, "Fund X");
        assert_eq!(summary.components.len(), 2);
        assert_eq!(summary.warnings.len(), 1);
        assert_eq!(summary.components[0].observations, 4);
    }

    #[test]
    fn test_definition_from_json() {
        let json = r#"{
            "name": "Fund X",
            "components": [
                { "name": "Equities", "weight": 0.5, "source": "mxwo.csv" },
                { "name": "Fixed Income", "weight": 0.5, "source": "/abs/sbwau.csv" }
            ]
        }"#;
        let definition = BenchmarkDefinition::from_json_str(json).unwrap();
        assert_eq!(definition.name, "Fund X");
        assert_eq!(definition.components[1].weight, 0.5);

        let benchmark_err = BenchmarkDefinition::from_json_str("{\"name\": 1}").unwrap_err();
        assert!(matches!(benchmark_err, BenchmarkError::Definition(_)));
    }

    #[test]
    fn test_definition_resolves_relative_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fund_x.json");
        fs::write(
            &path,
            r#"{"name": "Fund X", "components": [
                {"name": "Equities", "weight": 0.5, "source": "mxwo.csv"},
                {"name": "Cash", "weight": 0.5, "source": "/abs/cash.csv"}
            ]}"#,
        )
        .unwrap();

        let definition = BenchmarkDefinition::from_json_path(&path).unwrap();
        assert_eq!(definition.components[0].source, dir.path().join("mxwo.csv"));
        assert_eq!(definition.components[1].source, PathBuf::from("/abs/cash.csv"));
    }
}
