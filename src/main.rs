// Hourglass - Hourly table export to S3 with warehouse reload
// Copyright (c) 2025 Hourglass Contributors
// Licensed under the MIT License

use clap::Parser;
use hourglass::cli::{Cli, Commands};
use hourglass::config::{load_config, LoggingConfig};
use hourglass::logging::init_logging;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Optional; a missing .env is ignored
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let (log_level, logging_config) = logging_settings(&cli);
    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(e.exit_code());
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Hourglass - hourly table export"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(wait_for_shutdown(shutdown_tx));

    let exit_code = match execute_command(&cli, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5
        }
    };

    // process::exit skips destructors; flush the file writer first
    drop(guard);
    process::exit(exit_code);
}

/// Level and sinks for the logger
///
/// `run` is long-lived and honours the `[logging]` section; other commands
/// log to the console only. A config that fails to load here is reported
/// again by the command itself.
fn logging_settings(cli: &Cli) -> (String, LoggingConfig) {
    let config = match cli.command {
        Commands::Run(_) => load_config(&cli.config).ok(),
        _ => None,
    };

    let level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let logging = config
        .map(|c| c.logging)
        .unwrap_or_else(LoggingConfig::console_only);
    (level, logging)
}

/// Flip the shutdown channel on SIGINT or SIGTERM
async fn wait_for_shutdown(shutdown_tx: watch::Sender<bool>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to install SIGTERM handler, listening for Ctrl+C only"
                );
                if tokio::signal::ctrl_c().await.is_ok() {
                    notify_shutdown(&shutdown_tx, "SIGINT");
                }
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => notify_shutdown(&shutdown_tx, "SIGINT"),
            _ = sigterm.recv() => notify_shutdown(&shutdown_tx, "SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    {
        match tokio::signal::ctrl_c().await {
            Ok(()) => notify_shutdown(&shutdown_tx, "SIGINT"),
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C"),
        }
    }
}

fn notify_shutdown(shutdown_tx: &watch::Sender<bool>, signal: &str) {
    tracing::info!(signal, "Received shutdown signal, finishing current window");
    println!("\n⚠️  Shutdown signal received, finishing current window...");
    let _ = shutdown_tx.send(true);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Run(args) => args.execute(&cli.config, shutdown_signal).await,
        Commands::Locate(args) => args.execute(&cli.config).await,
        Commands::Status(args) => args.execute(&cli.config).await,
        Commands::Seed(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
