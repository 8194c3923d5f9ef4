mod api;
mod classify;
mod cli;
mod error;
mod models;
mod server;
mod service;
mod window;

use anyhow::Context;
use clap::Parser;
use cli::{App, Cli, LogFormat};
use colored::*;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before clap reads its env fallbacks
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _guard = init_logging(&cli);

    info!("Initializing climate odds service...");

    let app = match App::new(&cli) {
        Ok(app) => {
            info!("Application initialized successfully.");
            app
        },
        Err(e) => {
            error!("Failed to initialize application: {:?}", e);
            eprintln!(
                "{}",
                "Error: Failed to initialize application. Check logs.".red()
            );
            return Err(e.into());
        },
    };

    app.run().await.context("HTTP server terminated with an error")
}

/// Initializes `tracing` from the CLI options. `RUST_LOG` takes precedence over `--log-level`.
fn init_logging(cli: &Cli) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let (writer, guard) = match &cli.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "climate-odds.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        },
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(cli.log_dir.is_none())
        .with_target(true);

    match cli.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }

    guard
}
