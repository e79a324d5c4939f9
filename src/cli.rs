use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use price_forecast::data::{DataLoader, PriceSeries};
use price_forecast::events::{annotate, brent_events};
use price_forecast::models::GradientBoostedRegressor;
use price_forecast::pipeline::{forecast_prices, train_model};
use price_forecast::PipelineConfig;
use std::path::{Path, PathBuf};
use tracing::info;

/// Held-out days echoed after training
const HOLDOUT_PREVIEW: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "brent_panorama")]
#[command(author, version, about = "Brent crude price forecasting", long_about = None)]
pub struct Cli {
    /// Read prices from a local CSV instead of Yahoo Finance
    #[arg(long, global = true)]
    pub csv: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a model on the configured history and save it
    Train {
        /// TOML configuration file (defaults are used when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Where to write the model artifact
        #[arg(short, long, default_value = "brent_model.json")]
        model: PathBuf,
    },
    /// Forecast future prices with a saved model
    Forecast {
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long, default_value = "brent_model.json")]
        model: PathBuf,

        /// Optional CSV export of the forecast
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List market events that fall inside the loaded history
    Events {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Train { config, model } => {
            let config = load_config(config.as_deref())?;
            let series = load_series(&config, cli.csv.as_deref())?;
            let outcome = train_model(&series, &config).context("training failed")?;

            outcome
                .model
                .save(model)
                .with_context(|| format!("failed to write model to {}", model.display()))?;
            info!(
                train_rows = outcome.train_rows,
                test_rows = outcome.test_rows,
                mae = outcome.report.mae,
                rmse = outcome.report.rmse,
                r2 = outcome.report.r2,
                "model trained"
            );
            info!(path = %model.display(), "model saved");

            println!(
                "Trained on {} rows, evaluated on {} rows",
                outcome.train_rows, outcome.test_rows
            );
            print!("{}", outcome.report);

            let shown = outcome.holdout.len().min(HOLDOUT_PREVIEW);
            println!("Last {} held-out days:", shown);
            println!("{:<12} {:>10} {:>10}", "date", "actual", "predicted");
            for point in &outcome.holdout[outcome.holdout.len() - shown..] {
                println!(
                    "{:<12} {:>10.2} {:>10.2}",
                    point.date.to_string(),
                    point.actual,
                    point.predicted
                );
            }
        }
        Commands::Forecast {
            config,
            model,
            output,
        } => {
            let config = load_config(config.as_deref())?;
            let regressor = GradientBoostedRegressor::load(model)
                .with_context(|| format!("failed to read model from {}", model.display()))?;
            let series = load_series(&config, cli.csv.as_deref())?;
            let forecast =
                forecast_prices(&regressor, &series, &config).context("forecast failed")?;

            println!("Last observations:");
            for point in series.tail(10) {
                println!("  {}  {:>8.2}", point.date, point.price);
            }
            println!("Forecast ({} days):", forecast.len());
            for point in forecast.points() {
                println!("  {}  {:>8.2}", point.date, point.price);
            }

            if let Some(path) = output {
                forecast
                    .write_csv(path)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), "forecast exported");
            }
        }
        Commands::Events { config } => {
            let config = load_config(config.as_deref())?;
            let series = load_series(&config, cli.csv.as_deref())?;
            let annotations = annotate(&series, &brent_events());

            if annotations.is_empty() {
                println!("No events fall inside the loaded history");
            }
            for annotation in annotations {
                println!(
                    "{}  {:>8.2}  {}: {}",
                    annotation.event.date,
                    annotation.price,
                    annotation.event.title,
                    annotation.event.description
                );
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn load_series(config: &PipelineConfig, csv: Option<&Path>) -> Result<PriceSeries> {
    let data = &config.data;
    let series = match csv {
        Some(path) => DataLoader::from_csv(path).load(&data.ticker, data.start, data.end),
        None => DataLoader::yahoo()?.load(&data.ticker, data.start, data.end),
    }
    .with_context(|| format!("failed to load prices for {}", data.ticker))?;

    info!(
        ticker = %data.ticker,
        observations = series.len(),
        "prices loaded"
    );
    Ok(series)
}
