#![doc = include_str!("../README.md")]

mod app;

use anyhow::Context;
use app::config::{CliArgs, RepublishConfig};
use app::telemetry::init_telemetry;
use clap::Parser;
use republisher_core::{
    Dispatcher, Republisher, RunSummary, build_client, load_identifiers, validate_identifiers,
};
use std::{process::ExitCode, sync::Arc};
use tokio::signal;
use tokio_util::sync::CancellationToken;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = RepublishConfig::try_from(args)?;

    let providers = init_telemetry()?;
    log_startup_info(&config);

    let result = run(&config).await;
    providers.shutdown();

    let summary = result?;
    if config.fail_on_error && !summary.is_clean() {
        tracing::error!("Not every UUID was republished: {summary}");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

async fn run(config: &RepublishConfig) -> anyhow::Result<RunSummary> {
    let entries = load_identifiers(&config.uuids_file).context("failed to load UUIDs")?;
    let total = entries.len();
    let ids = validate_identifiers(entries);
    let skipped = total - ids.len();

    let republisher = Republisher::new(
        build_client(config.http)?,
        config.endpoints.clone(),
        config.collections.clone(),
    );

    let cancel = CancellationToken::new();
    let signals = tokio::spawn(cancel_on_shutdown_signal(cancel.clone()));

    let mut summary = Dispatcher::new(Arc::new(republisher), config.mode, cancel)
        .run(ids)
        .await;
    signals.abort();

    summary.skipped = skipped;
    if skipped > 0 {
        tracing::warn!("{skipped} of {total} entries were not valid UUIDs and were skipped");
    }
    Ok(summary)
}

fn log_startup_info(config: &RepublishConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting republish with full config: {config:#?}");
    } else {
        tracing::info!(
            "Starting republish of [{}] from [{}] to [{}] ({:?})",
            config.uuids_file.display(),
            config.endpoints.read_base(),
            config.endpoints.publish_url(),
            config.mode
        );
    }
}

/// Cancels `cancel` on Ctrl+C or SIGTERM. In-flight workers stop at their
/// next request and the rest are counted as cancelled.
async fn cancel_on_shutdown_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }

    tracing::warn!("Shutdown signal received, cancelling remaining republish work...");
    cancel.cancel();
}
