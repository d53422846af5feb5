//! bolsos-api - REST service for the bag catalog
//!
//! Resolves configuration, verifies the database is reachable, then serves
//! the catalog routes until interrupted.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bolsos_common::config::{AppConfig, ConfigOverrides};
use bolsos_common::db::open_store;
use bolsos_api::{build_router, AppState};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for bolsos-api
///
/// Every database option falls back to its DB_* environment variable, then
/// to the TOML file, then to the compiled default.
#[derive(Parser, Debug)]
#[command(name = "bolsos-api")]
#[command(about = "REST API for the bolsos catalog")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "BOLSOS_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on (host:port)
    #[arg(long)]
    bind: Option<String>,

    /// Storage backend: mysql or sqlite
    #[arg(long)]
    db_backend: Option<String>,

    #[arg(long)]
    db_host: Option<String>,

    #[arg(long)]
    db_user: Option<String>,

    #[arg(long)]
    db_password: Option<String>,

    #[arg(long)]
    db_name: Option<String>,

    #[arg(long)]
    db_port: Option<u16>,

    #[arg(long)]
    db_charset: Option<String>,

    /// SQLite database file (sqlite backend only)
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,

    /// Create the bolso table if it does not exist
    #[arg(long)]
    init_schema: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            bind: self.bind.clone(),
            backend: self.db_backend.clone(),
            host: self.db_host.clone(),
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            name: self.db_name.clone(),
            port: self.db_port,
            charset: self.db_charset.clone(),
            path: self.db_path.clone(),
            log_level: self.log_level.clone(),
            init_schema: self.init_schema,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref(), &args.overrides())
        .context("Failed to resolve configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting bolsos-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Database: {}", config.database.describe());

    let store = open_store(&config.database);

    if config.init_schema {
        store
            .ensure_schema()
            .await
            .context("Failed to initialize schema")?;
    }

    // Fail fast on bad connection parameters or a missing table
    match store.ping().await {
        Ok(()) => info!("✓ Connected to database ({})", store.backend()),
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e).context("Database connectivity check failed");
        }
    }

    let state = AppState::new(store);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server.bind))?;
    info!("bolsos-api listening on http://{}", config.server.bind);
    info!("Liveness check: http://{}/ping", config.server.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received");
}
