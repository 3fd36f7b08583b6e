//! Load the bundled Fund X benchmark and print its summary and correlations.
//!
//! Run with: `cargo run -p corrbench --example fund_x`

use corrbench::analytics::{CorrelationEngine, SeriesAligner};
use corrbench::data::CsvSeriesLoader;
use corrbench::output::MatrixExport;
use corrbench::{Benchmark, BenchmarkConfig, BenchmarkDefinition};
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fund_x.json");

    let definition = BenchmarkDefinition::from_json_path(&path)?;
    let benchmark = Benchmark::from_definition(
        definition,
        &CsvSeriesLoader::default(),
        &BenchmarkConfig::default(),
    )?;
    println!("{}", benchmark.summary().to_ascii_table());

    let table = benchmark.align_components(&SeriesAligner::new())?;
    let matrix = CorrelationEngine::try_default()?.compute(&table)?;
    let export =
        MatrixExport::from_matrix(&matrix).with_period(table.first_date(), table.last_date());
    println!("{}", export.to_ascii_table());

    for (a, b, r) in matrix.off_diagonal_pairs() {
        println!("{a:>12} / {b:<12} {r:>8.4}");
    }

    Ok(())
}
