use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{error, info};
use tracing_appender::rolling;

use crate::scenario::Scenario;

/// Batch Router CLI - Runs a batch of swap paths against a seeded in-memory ledger
///
/// The scenario file holds the ledger seed and a single batch request. By default the batch is
/// committed; with `--query` it is simulated on a discarded copy of the ledger.
#[derive(Parser, Debug, Clone, PartialEq)]
#[clap(version = env!("CARGO_PKG_VERSION"))]
struct CliArgs {
    /// Path to the JSON scenario file.
    #[clap(long, env = "BATCH_ROUTER_SCENARIO")]
    scenario: PathBuf,

    /// Simulate the batch without committing it.
    #[clap(long)]
    query: bool,

    /// Logging folder path.
    #[clap(long, default_value = "logs")]
    log_folder: String,

    /// Enable verbose logging. Shows every resolved step and each buffer or borrow decision.
    #[clap(long)]
    verbose: bool,
}

impl CliArgs {
    fn validate(&self) -> anyhow::Result<()> {
        if !self.scenario.is_file() {
            bail!("Scenario file {} does not exist", self.scenario.display());
        }
        Ok(())
    }
}

pub fn run_cli() -> anyhow::Result<()> {
    let args: CliArgs = CliArgs::parse();
    args.validate()?;

    // Setup Logging
    let log_level = if args.verbose { "debug" } else { "info" };
    let (non_blocking, _guard) =
        tracing_appender::non_blocking(rolling::never(&args.log_folder, "dev_logs.log"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(non_blocking)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set up logging subscriber")?;

    let scenario = Scenario::from_file(&args.scenario)?;
    info!(scenario = %args.scenario.display(), query = args.query, "Running scenario");
    let outcome = scenario.run(args.query).map_err(|err| {
        error!(error = %err, "Scenario failed");
        err
    })?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
