//! Trackle snippet generator - main entry point
//!
//! Hosts the daily reset pipeline and verification sweep behind a small
//! HTTP trigger surface. Scheduling is external: a cron job posts to
//! /api/reset and, later, /api/verify.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trackle_common::config::Config;
use trackle_gen::api::{self, AppState};
use trackle_gen::duration::DurationResolver;
use trackle_gen::pipeline::ResetPipeline;
use trackle_gen::storage::FsBlobStore;
use trackle_gen::{db, storage};

/// Command-line arguments for trackle-gen
#[derive(Parser, Debug)]
#[command(name = "trackle-gen")]
#[command(about = "Daily snippet generator for Trackle")]
#[command(version)]
struct Args {
    /// Config file path
    #[arg(short, long, env = "TRACKLE_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "TRACKLE_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trackle_gen=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config =
        Config::resolve(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }

    info!("Starting Trackle snippet generator on port {}", config.port);
    info!("Source bucket: {}", config.source_root.display());
    info!("Snippet bucket: {}", config.snippet_root.display());

    let pool = db::connect(&config.database_path)
        .await
        .context("Failed to open database")?;

    let source: Arc<dyn storage::BlobStore> = Arc::new(FsBlobStore::new(&config.source_root));
    let snippets: Arc<dyn storage::BlobStore> = Arc::new(FsBlobStore::new(&config.snippet_root));
    let resolver = DurationResolver::new(
        config.ffprobe_path.clone(),
        Duration::from_secs(config.probe_timeout_secs),
    );

    let pipeline = Arc::new(
        ResetPipeline::new(
            pool,
            source,
            snippets,
            resolver,
            config.snippet_duration_secs,
            config.modes.clone(),
        )
        .context("Failed to initialize pipeline")?,
    );
    info!("Pipeline initialized with {} mode(s)", config.modes.len());

    let app = api::create_router(AppState {
        pipeline,
        shared_secret: config.shared_secret.clone(),
        port: config.port,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

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
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
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
