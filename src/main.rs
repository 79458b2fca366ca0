//! CLI entry point for the vehicle emissions predictor.
//!
//! Provides subcommands for serving predictions over HTTP, predicting a
//! single vehicle, running a CSV batch, and dumping the reference tables.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use vehicle_emissions::{
    output::{PredictionRecord, append_record, print_json, print_report},
    predictor::{Predictor, PredictorConfig},
    request::{VehicleRequest, read_requests},
    server::{self, AppState},
};

#[derive(Parser)]
#[command(name = "vehicle_emissions")]
#[command(about = "Predict vehicle CO2 emissions, fuel use and running costs", long_about = None)]
struct Cli {
    /// Historical vehicle dataset (CSV, optionally .gz)
    #[arg(long, env = "VEHICLE_DATASET", default_value = "data/vehicles.csv", global = true)]
    dataset: PathBuf,

    /// Directory holding the five model artifacts
    #[arg(long, env = "MODELS_DIR", default_value = "models", global = true)]
    models_dir: PathBuf,

    /// Optional JSON file overriding fuel prices and constants
    #[arg(long, env = "PRICING_CONFIG", global = true)]
    pricing: Option<PathBuf>,

    /// Refuse to start if the dataset has labels missing from the taxonomy
    #[arg(long, default_value_t = false, global = true)]
    strict_taxonomy: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:5000")]
        bind: String,
    },
    /// Predict a single vehicle
    Predict {
        #[arg(long)]
        year: i32,

        #[arg(long)]
        make: String,

        /// Transmission code, e.g. A6 or AV
        #[arg(long)]
        transmission: String,

        /// Fuel type code: D, E, X or Z
        #[arg(long)]
        fuel_type: String,

        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Predict every row of a request CSV and append results to another CSV
    Batch {
        /// CSV with year,make,transmission,fuel_type columns
        #[arg(short, long)]
        input: PathBuf,

        /// CSV file to append results to
        #[arg(short, long, default_value = "predictions.csv")]
        output: PathBuf,
    },
    /// Print emission insights over the reference dataset
    Insights,
    /// Print the valid makes, transmissions, fuel types and years
    Options,
    /// Print the ordered feature schema
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/vehicle_emissions.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("vehicle_emissions.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let config = PredictorConfig {
        dataset: cli.dataset,
        models_dir: cli.models_dir,
        pricing: cli.pricing,
        strict_taxonomy: cli.strict_taxonomy,
    };
    let predictor = Predictor::load(&config).context("startup failed")?;

    match cli.command {
        Commands::Serve { bind } => {
            server::serve(&bind, AppState::new(predictor)).await?;
        }
        Commands::Predict {
            year,
            make,
            transmission,
            fuel_type,
            json,
        } => {
            let request = VehicleRequest::new(year, &make, &transmission, &fuel_type);
            let report = predictor.predict(&request)?;
            if json {
                print_json(&report)?;
            } else {
                print_report(&report)?;
            }
        }
        Commands::Batch { input, output } => {
            run_batch(&predictor, &input, &output)?;
        }
        Commands::Insights => print_json(predictor.insights())?,
        Commands::Options => print_json(&predictor.options())?,
        Commands::Schema => print_json(&predictor.schema().columns())?,
    }

    Ok(())
}

/// Predicts every request in `input`, appending one row per request
/// (including failed ones) to `output`.
#[tracing::instrument(skip(predictor), fields(input = %input.display(), output = %output.display()))]
fn run_batch(predictor: &Predictor, input: &Path, output: &Path) -> Result<()> {
    let file =
        File::open(input).with_context(|| format!("failed to open '{}'", input.display()))?;
    let requests = read_requests(file)
        .with_context(|| format!("failed to read requests from '{}'", input.display()))?;

    info!(requests = requests.len(), "Batch started");

    let mut failed = 0;
    for request in &requests {
        let record = match predictor.predict(request) {
            Ok(report) => PredictionRecord::from_report(request, &report),
            Err(e) => {
                warn!(
                    year = request.year,
                    make = %request.make,
                    error = %e,
                    "Batch row failed"
                );
                failed += 1;
                PredictionRecord::from_error(request, &e)
            }
        };
        append_record(output, &record)?;
    }

    info!(
        total = requests.len(),
        failed,
        "Batch finished"
    );
    Ok(())
}
