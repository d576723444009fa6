//! domscope-server - subdomain discovery and enrichment service
//!
//! Startup: load bootstrap config (CLI > env > TOML > defaults), install
//! tracing, open the database, wire providers, optionally start the periodic
//! refresh, then serve HTTP until Ctrl+C / SIGTERM.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use domscope_common::config::{load_toml_config, TomlConfig};
use domscope_common::db::init_database;
use domscope_server::services::spawn_refresh_task;
use domscope_server::{build_router, build_service, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for domscope-server
#[derive(Parser, Debug)]
#[command(name = "domscope-server")]
#[command(about = "Subdomain discovery and enrichment service")]
#[command(version)]
struct Args {
    /// Bootstrap TOML file (default: <config dir>/domscope/config.toml)
    #[arg(short, long, env = "DOMSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, env = "DOMSCOPE_DATABASE")]
    database: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, env = "DOMSCOPE_BIND")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "DOMSCOPE_PORT")]
    port: Option<u16>,
}

impl Args {
    /// Command-line and environment values take precedence over the file
    fn apply(self, mut config: TomlConfig) -> TomlConfig {
        if let Some(database) = self.database {
            config.database_path = Some(database);
        }
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_toml_config(args.config.as_deref())
        .context("Failed to load configuration")?;
    let config = args.apply(config);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting domscope-server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let db_path = config.database_path();
    info!("Database: {}", db_path.display());

    let db_pool = init_database(&db_path)
        .await
        .context("Failed to open database")?;

    let service = build_service(db_pool.clone(), &config)
        .context("Failed to initialize provider clients")?;

    if config.refresh.interval_secs > 0 {
        spawn_refresh_task(
            service.clone(),
            Duration::from_secs(config.refresh.interval_secs),
        );
    } else {
        info!("Periodic refresh disabled");
    }

    let app = build_router(AppState::new(db_pool, service), &config.cors);

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);
    info!(origins = ?config.cors.allowed_origins, "CORS origins");

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
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
