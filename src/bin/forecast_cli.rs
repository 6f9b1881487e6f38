use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{ArgAction, Args, Parser, Subcommand};
use meal_forecast::{
    artifacts::FileArtifactStore,
    config::{self, AppConfig},
    models::{ForecastPoint, ModelRegistryEntry, RunRequest, RunResult},
    services::ForecastingService,
};
use serde::Serialize;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize()?;

    match cli.command {
        Commands::Run(args) => handle_run(&context, args, cli.json).await?,
        Commands::Forecasts => handle_forecasts(&context, cli.json).await?,
        Commands::Registry => handle_registry(&context, cli.json).await?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(
    name = "forecast-cli",
    version,
    about = "Run meal demand forecasts and inspect the latest artifacts"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Execute a forecast run and overwrite the latest artifacts
    Run(RunArgs),
    /// Print the latest forecast points
    Forecasts,
    /// Print the latest model registry
    Registry,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Number of future periods (defaults to the configured horizon)
    #[arg(long)]
    horizon: Option<i64>,
    /// W (weekly) or M (monthly)
    #[arg(long)]
    frequency: Option<String>,
}

struct CliContext {
    config: AppConfig,
    service: ForecastingService,
}

impl CliContext {
    fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let artifacts = Arc::new(FileArtifactStore::new(&config.artifacts_dir));
        let service = ForecastingService::from_config(&config, artifacts);

        Ok(Self { config, service })
    }
}

async fn handle_run(context: &CliContext, args: RunArgs, json: bool) -> Result<()> {
    let request = RunRequest {
        horizon: args.horizon,
        frequency: args.frequency,
    };
    let result = context
        .service
        .run(request, Utc::now())
        .await
        .context("forecast run failed")?;

    if json {
        print_json(&result)
    } else {
        render_run(&context.config, &result);
        Ok(())
    }
}

async fn handle_forecasts(context: &CliContext, json: bool) -> Result<()> {
    let points = context
        .service
        .latest_forecasts()
        .await
        .context("failed to read latest forecasts")?;

    if json {
        return print_json(&points);
    }
    if points.is_empty() {
        println!("No forecasts yet. Run `forecast-cli run` first.");
        return Ok(());
    }
    println!("{:<24} {:<12} {:>12}", "CATEGORY", "PERIOD", "YHAT");
    points.iter().for_each(render_point);
    Ok(())
}

async fn handle_registry(context: &CliContext, json: bool) -> Result<()> {
    let entries = context
        .service
        .latest_registry()
        .await
        .context("failed to read model registry")?;

    if json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("Model registry is empty. Run `forecast-cli run` first.");
        return Ok(());
    }
    entries.iter().for_each(render_registry_entry);
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_run(config: &AppConfig, result: &RunResult) {
    println!(
        "Run completed at {} • horizon {} • frequency {} • version {}",
        result.generated_at, result.horizon, result.frequency, result.version
    );
    println!(
        "  {} categories, {} points written to {}",
        result.summary.categories,
        result.summary.points,
        config.artifacts_dir.display()
    );
}

fn render_point(point: &ForecastPoint) {
    println!("{:<24} {:<12} {:>12.2}", point.category, point.ds, point.yhat);
}

fn render_registry_entry(entry: &ModelRegistryEntry) {
    println!(
        "- {} • {} (window {}, frequency {}) • {}",
        entry.category, entry.model, entry.params.window, entry.params.frequency, entry.timestamp
    );
    if !entry.error.is_empty() {
        println!("  error: {}", entry.error);
    }
}
