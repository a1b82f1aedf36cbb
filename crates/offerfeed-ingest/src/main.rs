//! Offerfeed ingest service entry point

use anyhow::Result;
use clap::Parser;
use offerfeed_common::logging::{init_logging, LogConfig};
use offerfeed_ingest::config::JobConfig;
use offerfeed_ingest::scheduler::FeedScheduler;
use tokio::signal;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "offerfeed-ingest",
    about = "Scheduled affiliate product feed ingestion"
)]
struct Cli {
    /// Perform one guarded ingestion run and exit instead of scheduling
    #[arg(long)]
    run_once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env().unwrap_or_default();
    init_logging(&log_config)?;

    info!("Starting offerfeed ingest service");

    let config = JobConfig::from_env();
    let scheduler = FeedScheduler::from_config(&config).await?;

    if cli.run_once {
        scheduler.run_now(&config).await;
        return Ok(());
    }

    // None means the job is disabled by configuration; stay up so the
    // operator sees the diagnostic instead of a crash loop.
    let _handle = scheduler.start(config).await?;

    signal::ctrl_c().await?;
    info!("Shutdown signal received");

    Ok(())
}
