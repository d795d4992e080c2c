//! wortschatz-ui - vocabulary trainer web service
//!
//! Serves the learning API: auth, vocabulary catalog, flashcards with
//! per-word progress, aggregate progress with badges, and bulk import.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use wortschatz_common::auth::load_token_secret;
use wortschatz_common::config;
use wortschatz_common::db::{init, seed};
use wortschatz_ui::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "wortschatz-ui", about = "Vocabulary trainer web service")]
struct Args {
    /// Data folder (overrides WORTSCHATZ_DATA and the config file)
    #[arg(long)]
    data_folder: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "WORTSCHATZ_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "WORTSCHATZ_PORT", default_value_t = 5730)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Wortschatz UI (wortschatz-ui) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let data_folder = config::resolve_data_folder(args.data_folder.as_deref());
    config::ensure_data_folder(&data_folder)?;

    let db_path = config::database_path(&data_folder);
    info!("Database path: {}", db_path.display());

    let pool = match init::init_database(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    // Stock badges and starter vocabulary on a fresh database
    seed::seed_all(&pool).await?;

    // Credential signing secret (generated and stored on first run)
    let token_secret = load_token_secret(&pool).await?;
    info!("✓ Loaded credential signing secret");

    let state = AppState::new(pool, token_secret);
    let app = build_router(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("wortschatz-ui listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
