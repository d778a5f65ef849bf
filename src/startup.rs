//! Startup helpers for the content API server.

use std::process::ExitCode;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::server::{self, AppState};

/// Run the server until ctrl-c.
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting contentwork v{}", env!("CARGO_PKG_VERSION"));

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::from(1);
        }
    };
    let port = config.port;

    let state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to create state: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(server::run_server_with_shutdown(state, port, shutdown_signal())) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Initialize application state without starting the server.
///
/// # Errors
/// Returns an error if configuration or state creation fails.
pub fn initialize() -> Result<Arc<AppState>, Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::from_env().map_err(|e| format!("configuration error: {e}"))?;
    AppState::new(config)
}

/// Resolves when the process receives ctrl-c.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        return;
    }
    tracing::info!("Shutdown signal received");
}
