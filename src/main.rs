// src/main.rs
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::process;
use tracing::{error, info};

mod archive;
mod blob;
mod config;
mod fetch;
mod flatten;
mod load;
mod logging;
mod pipeline;
#[cfg(test)]
mod test_utils;

use crate::blob::S3Storage;
use crate::fetch::HttpFetcher;
use crate::load::PostgresLoader;
use crate::pipeline::Pipeline;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config.toml",
        global = true
    )]
    config: String,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the ingestion pipeline once
    Run {
        /// Logical date for the archive key (YYYY-MM-DD); defaults to today (UTC)
        #[arg(long)]
        date: Option<String>,

        /// Set by the scheduler when the invocation fires later than planned
        #[arg(long)]
        past_due: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match config::load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", cli.config, e);
            process::exit(1);
        }
    };

    let _log_guard = logging::init_logging(config.logging.as_ref(), cli.verbose)?;
    info!("bronze-ingest v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded configuration from: {}", cli.config);

    match cli.command {
        Commands::Run { date, past_due } => run_pipeline(config, date, past_due).await,
    }
}

/// Run the pipeline with real HTTP, blob storage and database clients
async fn run_pipeline(config: config::Config, date: Option<String>, past_due: bool) -> Result<()> {
    if past_due {
        info!("The timer is running late!");
    }

    let logical_date = match date {
        Some(text) => NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .context(format!("Failed to parse date: {}", text))?,
        None => Utc::now().date_naive(),
    };

    // Connection secrets are environment-only; a missing variable is a
    // startup error, never a pipeline error
    let secrets = match config::Secrets::from_env() {
        Ok(secrets) => secrets,
        Err(e) => {
            error!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    let pipeline = initialize_pipeline(config, &secrets).await?;

    match pipeline.run(logical_date).await {
        Ok(summary) => {
            info!(
                "Run {} succeeded: {} rows loaded, raw payload at {}",
                summary.run_id, summary.rows_loaded, summary.archive_key
            );
            Ok(())
        }
        Err(e) => {
            // Re-signal so the hosting scheduler records the run as failed.
            // Returning the error (rather than exiting here) lets main drop
            // the log guard and flush the file sink before the process ends.
            error!("PIPELINE FAILED: {}", e);
            Err(e.into())
        }
    }
}

async fn initialize_pipeline(
    config: config::Config,
    secrets: &config::Secrets,
) -> Result<Pipeline<HttpFetcher, S3Storage, PostgresLoader>, anyhow::Error> {
    let fetcher = HttpFetcher::new().context("Failed to initialize HTTP client")?;
    let storage = S3Storage::new(&secrets.storage);
    let loader = PostgresLoader::new(&secrets.sql_connection_string)
        .await
        .context("Failed to connect to database")?;

    let pipeline =
        Pipeline::new(fetcher, storage, loader, &config).context("Failed to assemble pipeline")?;

    info!("Pipeline initialized successfully");
    Ok(pipeline)
}
