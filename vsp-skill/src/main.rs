//! Voice Skill Player (vsp-skill) - Main entry point
//!
//! Serves the voice platform endpoint and keeps each user's place in the
//! playlist across invocations.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vsp_common::Catalog;
use vsp_skill::api::{self, AppState};
use vsp_skill::config::{Config, ConfigOverrides};
use vsp_skill::db::{MemoryPlaybackStore, PlaybackStore, SqlitePlaybackStore};
use vsp_skill::signing::{HmacUrlSigner, UrlSigner};
use vsp_skill::Skill;

/// Command-line arguments for vsp-skill
#[derive(Parser, Debug)]
#[command(name = "vsp-skill")]
#[command(about = "Playback continuity service for a voice audio player")]
#[command(version)]
struct Args {
    /// Configuration file (also read from VSP_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "VSP_PORT")]
    port: Option<u16>,

    /// SQLite database holding playback records
    #[arg(short, long, env = "VSP_DATABASE")]
    database: Option<PathBuf>,

    /// Track catalog file
    #[arg(long, env = "VSP_CATALOG")]
    catalog: Option<PathBuf>,

    /// Base URL media keys are signed against
    #[arg(long, env = "VSP_SIGNING_BASE_URL")]
    signing_base_url: Option<String>,

    /// Secret shared with the media host
    #[arg(long, env = "VSP_SIGNING_SECRET", hide_env_values = true)]
    signing_secret: Option<String>,

    /// Log level when RUST_LOG is not set
    #[arg(long, env = "VSP_LOG_LEVEL")]
    log_level: Option<String>,

    /// Keep playback records in memory only
    #[arg(long, env = "VSP_EPHEMERAL")]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        port: args.port,
        database_path: args.database,
        catalog_path: args.catalog,
        signing_base_url: args.signing_base_url,
        signing_secret: args.signing_secret,
        log_level: args.log_level,
    };
    let config = Config::load(args.config.as_deref(), overrides)
        .context("Failed to load configuration")?;

    // Initialize tracing
    let default_filter = format!(
        "vsp_skill={level},vsp_common={level},tower_http=debug",
        level = config.log_level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting vsp-skill v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config.source {
        Some(path) => info!("Configuration: {}", path.display()),
        None => warn!("No configuration file found, using compiled defaults"),
    }

    let catalog = Arc::new(
        Catalog::load(&config.catalog_path).context("Failed to load track catalog")?,
    );

    let signer = HmacUrlSigner::new(&config.signing).context("Invalid signing configuration")?;
    if !signer.has_secret() {
        warn!("No signing secret configured; playback requests will be answered with an apology");
    }
    let signer: Arc<dyn UrlSigner> = Arc::new(signer);

    if args.ephemeral {
        warn!("Ephemeral mode: playback records are lost on exit");
        let skill = Skill::new(catalog, MemoryPlaybackStore::new(), signer, config.card.clone());
        serve(AppState::new(skill), config.port).await
    } else {
        let pool = vsp_common::db::init_database(&config.database_path)
            .await
            .context("Failed to initialize database")?;
        let skill = Skill::new(catalog, SqlitePlaybackStore::new(pool), signer, config.card.clone());
        serve(AppState::new(skill), config.port).await
    }
}

async fn serve<S: PlaybackStore>(state: AppState<S>, port: u16) -> Result<()> {
    let app = api::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
