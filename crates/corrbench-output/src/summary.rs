//! Benchmark summary.
//!
//! Plain data describing a loaded benchmark: its weights, any validation
//! warnings and the coverage of each component series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One weighted component of a benchmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentSummary {
    /// Component (asset) name.
    pub name: String,

    /// Weight in the benchmark.
    pub weight: f64,

    /// Number of price observations loaded.
    pub observations: usize,

    /// First observation date.
    pub first_date: NaiveDate,

    /// Last observation date.
    pub last_date: NaiveDate,

    /// File the series was loaded from, if any.
    pub source: Option<PathBuf>,
}

impl fmt::Display for ComponentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.2}% ({} observations, {} to {})",
            self.name,
            self.weight * 100.0,
            self.observations,
            self.first_date,
            self.last_date
        )
    }
}

/// Summary of a weighted benchmark.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use corrbench_output::{BenchmarkSummary, ComponentSummary};
///
/// let summary = BenchmarkSummary {
///     name: "Fund X".to_string(),
///     total_weight: 1.0,
///     warnings: vec![],
///     components: vec![ComponentSummary {
///         name: "Equities".to_string(),
///         weight: 1.0,
///         observations: 4,
///         first_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
///         last_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
///         source: None,
///     }],
/// };
///
/// assert!(summary.to_ascii_table().contains("Fund X"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenchmarkSummary {
    /// Benchmark name.
    pub name: String,

    /// Sum of all component weights.
    pub total_weight: f64,

    /// Validation warnings raised while building the benchmark.
    pub warnings: Vec<String>,

    /// Components, ordered by name.
    pub components: Vec<ComponentSummary>,
}

impl BenchmarkSummary {
    /// Render as a fixed-width text table.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nBenchmark: {}\n", self.name));
        output.push_str(&"=".repeat(80));
        output.push('\n');
        output.push_str(&format!(
            "{:<24} {:>10} {:>8} {:>12} {:>12}\n",
            "Component", "Weight", "Obs", "First", "Last"
        ));
        output.push_str(&"-".repeat(80));
        output.push('\n');

        for component in &self.components {
            output.push_str(&format!(
                "{:<24} {:>9.2}% {:>8} {:>12} {:>12}\n",
                component.name,
                component.weight * 100.0,
                component.observations,
                component.first_date.to_string(),
                component.last_date.to_string()
            ));
        }

        output.push_str(&"-".repeat(80));
        output.push('\n');
        output.push_str(&format!("{:<24} {:>9.2}%\n", "Total", self.total_weight * 100.0));
        output.push_str(&"=".repeat(80));
        output.push('\n');

        for warning in &self.warnings {
            output.push_str(&format!("Warning: {}\n", warning));
        }

        output
    }

    /// Render as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Benchmark: {}\n\n", self.name));
        output.push_str("| Component | Weight | Observations | First | Last |\n");
        output.push_str("|---|---:|---:|---|---|\n");
        for c in &self.components {
            output.push_str(&format!(
                "| {} | {:.2}% | {} | {} | {} |\n",
                c.name,
                c.weight * 100.0,
                c.observations,
                c.first_date,
                c.last_date
            ));
        }
        output.push_str(&format!("\n**Total weight:** {:.2}%\n", self.total_weight * 100.0));

        if !self.warnings.is_empty() {
            output.push_str("\n## Warnings\n\n");
            for warning in &self.warnings {
                output.push_str(&format!("- {}\n", warning));
            }
        }

        output
    }
}

impl fmt::Display for BenchmarkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Benchmark: {}", self.name)?;
        for component in &self.components {
            writeln!(f, "  {}", component)?;
        }
        write!(f, "  Total weight: {:.4}", self.total_weight)?;
        for warning in &self.warnings {
            write!(f, "\n  Warning: {}", warning)?;
        }
        Ok(())
    }
}
