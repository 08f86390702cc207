// Post archiver binary entry point

use anyhow::Result;
use post_archiver::config::Settings;
use post_archiver::pipeline::PostProcessor;
use post_archiver::schedule::{run_timer, TimerTrigger};
use post_archiver::source::{HttpPostSource, PostSource};
use post_archiver::storage::{BlobSink, S3BlobSink};
use post_archiver::telemetry;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::load().map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    settings
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    // Initialize tracing
    telemetry::init_logging(&settings.observability.log_level)?;

    info!("Starting post archiver worker");
    info!(
        source_url = %settings.source.url,
        container = %settings.storage.container,
        cron = %settings.scheduler.cron_expression,
        user_id = settings.scheduler.target_user_id,
        "Configuration loaded"
    );

    // Initialize feed source and blob sink
    let source: Arc<dyn PostSource> = Arc::new(HttpPostSource::new(&settings.source)?);
    info!("Feed source initialized");

    let sink: Arc<dyn BlobSink> = Arc::new(S3BlobSink::new(&settings.storage)?);
    info!("Blob storage sink initialized");

    let processor = PostProcessor::new(source, sink, settings.scheduler.target_user_id);

    // Parse the timer schedule
    let trigger = TimerTrigger::new(&settings.scheduler.cron_expression)?;
    info!("Timer trigger initialized");

    // Set up graceful shutdown
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received, initiating graceful shutdown"),
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
        let _ = shutdown_tx.send(());
    });

    info!("Worker is running. Press Ctrl+C to shutdown gracefully");
    run_timer(&trigger, &processor, shutdown_rx).await;

    info!("Worker shutdown complete");
    Ok(())
}
