use crate::api::{PowerClient, BASE_URL, DEFAULT_TIMEOUT};
use crate::error::{AppError, Result};
use crate::server::{self, AppState, ClassifyMode};
use axum::Router;
use clap::{ArgAction, Parser, ValueEnum};
use colored::*;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP service turning NASA POWER daily history into climate category odds
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Address to listen on
    #[arg(short, long, env = "LISTEN_ADDR", default_value = "0.0.0.0:5000")]
    pub listen: String,

    /// NASA POWER daily point endpoint
    #[arg(long, env = "POWER_BASE_URL", default_value = BASE_URL)]
    pub base_url: String,

    /// Timeout for each per-year provider request, in seconds
    #[arg(long, env = "POWER_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Whether /api/{parameter} echoes the fetch plan or classifies live
    #[arg(long, env = "CLASSIFY_MODE", value_enum, default_value_t = ClassifyMode::TwoStep)]
    pub mode: ClassifyMode,

    /// Allow cross-origin requests from any origin
    #[arg(long, env = "ENABLE_CORS", default_value_t = true, action = ArgAction::Set)]
    pub enable_cors: bool,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Also write daily-rotated log files to this directory
    #[arg(long, env = "LOG_DIR")]
    pub log_dir: Option<String>,
}

/// The HTTP application: validated configuration plus shared state.
pub struct App {
    listen: SocketAddr,
    enable_cors: bool,
    state: Arc<AppState>,
}

impl App {
    /// Validates the configuration and builds the provider client.
    pub fn new(cli: &Cli) -> Result<Self> {
        let listen: SocketAddr = cli.listen.parse().map_err(|e| {
            AppError::Config(format!("Invalid listen address '{}': {}", cli.listen, e))
        })?;

        if cli.timeout_secs == 0 {
            return Err(AppError::Config(
                "POWER_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        let timeout = Duration::from_secs(cli.timeout_secs);
        let client = PowerClient::with_base_url(&cli.base_url, timeout)?;
        info!(
            "Using NASA POWER endpoint {} (timeout {}s)",
            client.base_url(),
            cli.timeout_secs
        );
        if cli.mode == ClassifyMode::Live {
            info!("Category endpoints classify live; *_after_res routes are disabled");
        }
        if !cli.enable_cors {
            warn!("CORS disabled; browser clients on other origins will be rejected");
        }

        Ok(Self {
            listen,
            enable_cors: cli.enable_cors,
            state: Arc::new(AppState {
                client,
                mode: cli.mode,
            }),
        })
    }

    pub fn router(&self) -> Router {
        server::router(self.state.clone(), self.enable_cors)
    }

    /// Binds the listener and serves until Ctrl+C.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.listen).await?;
        info!("Listening on {}", self.listen);
        println!(
            "{}",
            format!("Climate odds API ready at http://{}", self.listen)
                .cyan()
                .bold()
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        println!("{}", "Server stopped. Goodbye!".green());
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const ENV_KEYS: [&str; 8] = [
        "LISTEN_ADDR",
        "POWER_BASE_URL",
        "POWER_TIMEOUT_SECS",
        "CLASSIFY_MODE",
        "ENABLE_CORS",
        "LOG_LEVEL",
        "LOG_FORMAT",
        "LOG_DIR",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let cli = Cli::try_parse_from(["climate-odds"]).unwrap();

        assert_eq!(cli.listen, "0.0.0.0:5000");
        assert_eq!(cli.base_url, BASE_URL);
        assert_eq!(cli.timeout_secs, 15);
        assert_eq!(cli.mode, ClassifyMode::TwoStep);
        assert!(cli.enable_cors);
        assert_eq!(cli.log_format, LogFormat::Pretty);
        assert!(cli.log_dir.is_none());
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        clear_env();
        env::set_var("CLASSIFY_MODE", "live");
        env::set_var("POWER_TIMEOUT_SECS", "30");
        env::set_var("ENABLE_CORS", "false");
        env::set_var("LOG_FORMAT", "json");

        let cli = Cli::try_parse_from(["climate-odds"]).unwrap();
        clear_env();

        assert_eq!(cli.mode, ClassifyMode::Live);
        assert_eq!(cli.timeout_secs, 30);
        assert!(!cli.enable_cors);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    #[serial]
    fn test_flags_override_environment() {
        clear_env();
        env::set_var("LISTEN_ADDR", "127.0.0.1:9000");

        let cli = Cli::try_parse_from([
            "climate-odds",
            "--listen",
            "127.0.0.1:7000",
            "--mode",
            "two-step",
        ])
        .unwrap();
        clear_env();

        assert_eq!(cli.listen, "127.0.0.1:7000");
        assert_eq!(cli.mode, ClassifyMode::TwoStep);
    }

    #[test]
    #[serial]
    fn test_app_rejects_bad_config() {
        clear_env();
        let cli = Cli::try_parse_from(["climate-odds", "--listen", "not-an-address"]).unwrap();
        assert!(matches!(App::new(&cli), Err(AppError::Config(_))));

        let cli = Cli::try_parse_from(["climate-odds", "--timeout-secs", "0"]).unwrap();
        assert!(matches!(App::new(&cli), Err(AppError::Config(_))));

        let cli = Cli::try_parse_from(["climate-odds", "--listen", "127.0.0.1:0"]).unwrap();
        assert!(App::new(&cli).is_ok());
    }
}
