//! Host telemetry probe entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;

use hostprobe::{init_tracing, AgentConfig, Scheduler};

#[derive(Parser, Debug)]
#[command(name = "hostprobe", version, about = "Host telemetry probe")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, default_value = "hostprobe.json5")]
    config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AgentConfig::load_from_file(&args.config)
        .map_err(|e| anyhow::anyhow!("cannot start: {}", e))?;

    let level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.logging.level);
    init_tracing(level)?;

    tracing::info!(
        collector = %config.collector.url,
        interval_secs = config.probe.interval_secs,
        "hostprobe starting"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = Scheduler::new(config);
    let scheduler_task = tokio::spawn(scheduler.run(shutdown_rx));

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
    }
    tracing::info!("shutting down");
    let _ = shutdown_tx.send(true);

    // Give the in-flight cycle a grace period, then abandon it.
    match tokio::time::timeout(std::time::Duration::from_secs(10), scheduler_task).await {
        Ok(result) => result?,
        Err(_) => tracing::warn!("scheduler did not stop within grace period, abandoning"),
    }

    Ok(())
}
