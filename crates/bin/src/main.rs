//! corrbench CLI binary.
//!
//! Correlates a directory of price files, or loads a weighted benchmark
//! definition and summarizes it.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use corrbench::{
    Benchmark, BenchmarkConfig, BenchmarkDefinition, PipelineConfig, correlate_directory,
};
use corrbench_analytics::{CorrelationBasis, CorrelationConfig, CorrelationEngine, SeriesAligner};
use corrbench_data::CsvSeriesLoader;
use corrbench_output::{BenchmarkSummary, ExportError, ExportFormat, Exporter, MatrixExport};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Parser)]
#[command(name = "corrbench")]
#[command(about = "Correlation of price series and weighted benchmarks", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Correlate every price file in a directory
    Correlate {
        /// Directory holding one price file per asset
        #[arg(long, env = "CORRBENCH_DATA_DIR", default_value = "data")]
        dir: PathBuf,

        /// Extension of the price files
        #[arg(long, default_value = "csv")]
        extension: String,

        /// Quantity to correlate
        #[arg(long, value_enum, default_value_t = Basis::Returns)]
        basis: Basis,

        /// Minimum number of observations of the chosen basis
        #[arg(long, default_value_t = 2)]
        min_observations: usize,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Load a benchmark definition and summarize it
    Benchmark {
        /// Benchmark definition (JSON)
        definition: PathBuf,

        /// Also correlate the benchmark components
        #[arg(long)]
        correlate: bool,

        /// Quantity to correlate
        #[arg(long, value_enum, default_value_t = Basis::Returns)]
        basis: Basis,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Write to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Basis {
    Returns,
    Prices,
}

impl From<Basis> for CorrelationBasis {
    fn from(basis: Basis) -> Self {
        match basis {
            Basis::Returns => Self::Returns,
            Basis::Prices => Self::Prices,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Markdown,
    Csv,
    Json,
}

impl From<Format> for ExportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => Self::Text,
            Format::Markdown => Self::Markdown,
            Format::Csv => Self::Csv,
            Format::Json => Self::PrettyJson,
        }
    }
}

/// Benchmark summary with the optional correlation of its components
#[derive(Debug, Serialize)]
struct BenchmarkOutput {
    benchmark: BenchmarkSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation: Option<MatrixExport>,
}

impl Exporter for BenchmarkOutput {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
            ExportFormat::Csv if self.correlation.is_some() => Err(ExportError::InvalidFormat(
                "CSV holds a single table; use --format json or drop --correlate".to_string(),
            )),
            ExportFormat::Text | ExportFormat::Markdown | ExportFormat::Csv => {
                let mut content = self.benchmark.export_to_string(format)?;
                if let Some(matrix) = &self.correlation {
                    content.push('\n');
                    content.push_str(&matrix.export_to_string(format)?);
                }
                Ok(content)
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let result = init_tracing(cli.verbose).and_then(|()| run(cli));

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let mut source = e.source();
        while let Some(cause) = source {
            eprintln!("  Caused by: {}", cause);
            source = cause.source();
        }
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) -> Result<(), Box<dyn Error>> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let show_progress = cli.verbose == 0;

    match cli.command {
        Commands::Correlate {
            dir,
            extension,
            basis,
            min_observations,
            output,
        } => {
            let engine = CorrelationEngine::new(CorrelationConfig {
                basis: basis.into(),
                min_observations,
                ..Default::default()
            })?;
            let config = PipelineConfig { extension };

            let pb = spinner(show_progress, "Correlating price files...");
            let report = correlate_directory(&dir, &config, &CsvSeriesLoader::default(), &engine);
            pb.finish_and_clear();
            let report = report?;

            let export = MatrixExport::from_matrix(&report.matrix)
                .with_period(report.first_date, report.last_date);
            emit(&export, &output)?;
        }
        Commands::Benchmark {
            definition,
            correlate,
            basis,
            output,
        } => {
            let pb = spinner(show_progress, "Loading benchmark...");
            let result = load_benchmark(&definition, correlate, basis);
            pb.finish_and_clear();

            emit(&result?, &output)?;
        }
    }

    Ok(())
}

fn load_benchmark(
    definition: &Path,
    correlate: bool,
    basis: Basis,
) -> Result<BenchmarkOutput, Box<dyn Error>> {
    let definition = BenchmarkDefinition::from_json_path(definition)?;
    let benchmark = Benchmark::from_definition(
        definition,
        &CsvSeriesLoader::default(),
        &BenchmarkConfig::default(),
    )?;

    let correlation = if correlate {
        let engine = CorrelationEngine::new(CorrelationConfig {
            basis: basis.into(),
            ..Default::default()
        })?;
        let table = benchmark.align_components(&SeriesAligner::new())?;
        let matrix = engine.compute(&table)?;
        Some(MatrixExport::from_matrix(&matrix).with_period(table.first_date(), table.last_date()))
    } else {
        None
    };

    Ok(BenchmarkOutput {
        benchmark: benchmark.summary(),
        correlation,
    })
}

fn spinner(visible: bool, message: &'static str) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    pb
}

/// Print to stdout, or write to `--output` when given
fn emit<E: Exporter>(value: &E, args: &OutputArgs) -> Result<(), ExportError> {
    let format = ExportFormat::from(args.format);

    if let Some(path) = &args.output {
        value.export_to_file(path, format)?;
        info!(path = %path.display(), format = format.extension(), "Wrote output");
        return Ok(());
    }

    let content = value.export_to_string(format)?;
    if content.ends_with('\n') {
        print!("{}", content);
    } else {
        println!("{}", content);
    }
    Ok(())
}
