//! Correlation matrix rendering.

use chrono::NaiveDate;
use corrbench_analytics::CorrelationMatrix;
use serde::{Deserialize, Serialize};

/// Correlation matrix in plain, serializable form.
///
/// `NaN` coefficients are stored as `None` so they survive JSON round trips.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatrixExport {
    /// Quantity that was correlated ("returns" or "prices").
    pub basis: String,

    /// Number of observations behind each coefficient.
    pub observations: usize,

    /// First aligned date, if known.
    pub period_start: Option<NaiveDate>,

    /// Last aligned date, if known.
    pub period_end: Option<NaiveDate>,

    /// Asset names, in row/column order.
    pub assets: Vec<String>,

    /// Row-major coefficients.
    pub values: Vec<Vec<Option<f64>>>,

    /// Assets with zero variance.
    pub undefined_assets: Vec<String>,
}

impl MatrixExport {
    /// Capture a correlation matrix.
    pub fn from_matrix(matrix: &CorrelationMatrix) -> Self {
        let values = matrix
            .values()
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .map(|v| if v.is_nan() { None } else { Some(*v) })
                    .collect()
            })
            .collect();

        Self {
            basis: matrix.basis().to_string(),
            observations: matrix.observations(),
            period_start: None,
            period_end: None,
            assets: matrix.assets().to_vec(),
            values,
            undefined_assets: matrix.undefined_assets().to_vec(),
        }
    }

    /// Attach the aligned date range.
    pub const fn with_period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.period_start = Some(start);
        self.period_end = Some(end);
        self
    }

    fn label_width(&self) -> usize {
        self.assets
            .iter()
            .map(|a| a.chars().count())
            .max()
            .unwrap_or(0)
            .max(6)
    }

    fn cell_width(&self) -> usize {
        self.label_width().max(9)
    }

    /// Render as a fixed-width text table.
    pub fn to_ascii_table(&self) -> String {
        let label = self.label_width();
        let cell = self.cell_width();
        let total = label + (cell + 1) * self.assets.len();
        let mut output = String::new();

        output.push_str(&format!("\nCorrelation Matrix ({})\n", self.basis));
        if let (Some(start), Some(end)) = (self.period_start, self.period_end) {
            output.push_str(&format!("Period: {} to {}\n", start, end));
        }
        output.push_str(&format!("Observations: {}\n", self.observations));
        output.push_str(&"=".repeat(total));
        output.push('\n');

        output.push_str(&format!("{:<label$}", ""));
        for asset in &self.assets {
            output.push_str(&format!(" {:>cell$}", asset));
        }
        output.push('\n');
        output.push_str(&"-".repeat(total));
        output.push('\n');

        for (asset, row) in self.assets.iter().zip(&self.values) {
            output.push_str(&format!("{:<label$}", asset));
            for value in row {
                output.push_str(&format!(" {:>cell$}", format_value(*value)));
            }
            output.push('\n');
        }

        output.push_str(&"=".repeat(total));
        output.push('\n');

        if !self.undefined_assets.is_empty() {
            output.push_str(&format!(
                "Undefined (zero variance): {}\n",
                self.undefined_assets.join(", ")
            ));
        }

        output
    }

    /// Render as a Markdown table.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Correlation Matrix ({})\n\n", self.basis));
        if let (Some(start), Some(end)) = (self.period_start, self.period_end) {
            output.push_str(&format!("**Period:** {} to {}\n\n", start, end));
        }
        output.push_str(&format!("**Observations:** {}\n\n", self.observations));

        output.push_str("| |");
        for asset in &self.assets {
            output.push_str(&format!(" {} |", asset));
        }
        output.push('\n');
        output.push_str("|---|");
        output.push_str(&"---:|".repeat(self.assets.len()));
        output.push('\n');

        for (asset, row) in self.assets.iter().zip(&self.values) {
            output.push_str(&format!("| **{}** |", asset));
            for value in row {
                output.push_str(&format!(" {} |", format_value(*value)));
            }
            output.push('\n');
        }

        if !self.undefined_assets.is_empty() {
            output.push_str(&format!(
                "\nUndefined (zero variance): {}\n",
                self.undefined_assets.join(", ")
            ));
        }

        output
    }

    /// Header and rows for CSV output; the first column holds asset names.
    pub(crate) fn csv_records(&self) -> Vec<Vec<String>> {
        let mut records = Vec::with_capacity(self.assets.len() + 1);

        let mut header = vec!["asset".to_string()];
        header.extend(self.assets.iter().cloned());
        records.push(header);

        for (asset, row) in self.assets.iter().zip(&self.values) {
            let mut record = vec![asset.clone()];
            record.extend(
                row.iter()
                    .map(|v| v.map_or_else(|| "NaN".to_string(), |x| x.to_string())),
            );
            records.push(record);
        }

        records
    }
}

fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{:.4}", v))
}
