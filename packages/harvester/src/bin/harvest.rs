//! Harvest CLI
//!
//! One invocation scans one checkpoint window and exits. Schedule it (cron,
//! systemd timer) to sweep the catalog.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use harvester::{
    ActivityLog, CrawlDriver, FileActivityLog, HarvestConfig, HttpFetcher, PostgresStore,
    RecordStore, RunStatus, RunSummary, ScanCheckpoint,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "harvest")]
#[command(about = "Resumable catalog harvester")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the current checkpoint window (default)
    Run,

    /// Write the initial checkpoint window
    Seed {
        #[arg(long)]
        from: i64,
        #[arg(long)]
        to: i64,
        /// Overwrite an existing checkpoint
        #[arg(long)]
        force: bool,
    },

    /// Show the checkpoint and stored product count
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,harvester=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();
    let config = HarvestConfig::from_env().context("Failed to load configuration")?;

    let store = PostgresStore::connect(&config)
        .await
        .context("Failed to connect to record store")?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(&config, store).await,
        Commands::Seed { from, to, force } => {
            let result = seed(&store, ScanCheckpoint::new(from, to), force).await;
            store.close().await;
            result
        }
        Commands::Status => {
            let result = status(&store).await;
            store.close().await;
            result
        }
    }
}

async fn run(config: &HarvestConfig, store: PostgresStore) -> Result<()> {
    let fetcher = HttpFetcher::new(config).context("Failed to build HTTP client")?;
    let driver = CrawlDriver::new(fetcher, store, config);

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Shutdown requested, stopping after the current item");
        signal_token.cancel();
    });

    match &config.activity_log {
        Some(path) => {
            info!(path = %path.display(), "Writing activity log");
            execute(driver.with_activity_log(FileActivityLog::new(path)), cancel).await
        }
        None => execute(driver, cancel).await,
    }
}

async fn execute<L: ActivityLog>(
    driver: CrawlDriver<HttpFetcher, PostgresStore, L>,
    cancel: CancellationToken,
) -> Result<()> {
    let outcome = driver.run_with_cancel(cancel).await;
    driver.store().close().await;

    let summary = outcome.context("Harvest run failed")?;
    print_summary(&summary)
}

fn print_summary(summary: &RunSummary) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);

    if let RunStatus::Interrupted { resume_from } = summary.status {
        warn!(
            resume_from,
            "Run interrupted; the same window will be rescanned next time"
        );
    }
    Ok(())
}

async fn seed(store: &PostgresStore, checkpoint: ScanCheckpoint, force: bool) -> Result<()> {
    checkpoint.validate()?;

    if let Some(existing) = store.find_checkpoint().await? {
        if !force {
            bail!(
                "checkpoint {} already exists; pass --force to overwrite",
                existing
            );
        }
        warn!(%existing, "Overwriting existing checkpoint");
    }

    store.save_checkpoint(&checkpoint).await?;
    info!(%checkpoint, "Checkpoint seeded");
    Ok(())
}

async fn status(store: &PostgresStore) -> Result<()> {
    match store.find_checkpoint().await? {
        Some(checkpoint) => println!("checkpoint: {} ({} ids)", checkpoint, checkpoint.len()),
        None => println!("checkpoint: not seeded"),
    }
    println!("products:   {}", store.count_products().await?);
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable, listening for Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
