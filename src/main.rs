//! RapydShare launcher.
//!
//! Loads configuration, prepares the thumbnail cache, starts the server and
//! prints the URL other devices can open. Runs until Ctrl+C or SIGTERM.

mod cli;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use rapyd_api::ServerLifecycle;
use rapyd_core::config::AppConfig;
use rapyd_core::error::AppError;
use rapyd_storage::prepare_cache_dir;

use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match AppConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    cli.apply(&mut config);

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Start the server and block until a shutdown signal arrives.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting RapydShare v{}", env!("CARGO_PKG_VERSION"));

    prepare_cache_dir(&config.thumbnail.cache_dir).await?;

    let lifecycle = ServerLifecycle::new();
    lifecycle.start(config).await?;

    if let Some(url) = lifecycle.share_url().await {
        tracing::info!(%url, "Sharing");
        println!("RapydShare is running at {url}");
    }

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");

    lifecycle.stop().await?;
    tracing::info!("RapydShare shut down gracefully");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
