//! feynman-tutor - Lecture review microservice
//!
//! **Module Identity:**
//! - Name: feynman-tutor
//! - Default port: 5780
//!
//! Ingests lecture text into concepts and runs "explain it back" review
//! sessions against an OpenAI-compatible language model.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feynman_common::config::{default_config_path, load_toml_config, prepare_root_folder, resolve_root_folder};
use feynman_tutor::services::{LanguageModel, OpenAiClient};
use feynman_tutor::{AppState, ServiceLimits};

const DEFAULT_PORT: u16 = 5780;

/// Active review lifecycles older than this are treated as abandoned
const ABANDONED_SESSION_DAYS: i64 = 7;

/// Command-line arguments for feynman-tutor
#[derive(Parser, Debug)]
#[command(name = "feynman-tutor")]
#[command(about = "Lecture ingestion and Feynman-technique review service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides TOML `port`)
    #[arg(short, long, env = "FEYNMAN_PORT")]
    port: Option<u16>,

    /// Root folder holding the database
    #[arg(short, long, env = "FEYNMAN_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// Bootstrap TOML config file
    #[arg(short, long, env = "FEYNMAN_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_path = args.config.clone().or_else(|| default_config_path("feynman-tutor"));
    let toml_config = match &toml_path {
        Some(path) => load_toml_config(path).context("Failed to load TOML config")?,
        None => Default::default(),
    };

    // RUST_LOG wins over the TOML level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "feynman_tutor={level},feynman_common={level},tower_http={level}",
                    level = toml_config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting feynman-tutor v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &toml_path {
        info!("Config file: {}", path.display());
    }

    // Root folder and database
    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    let db_path = prepare_root_folder(&root_folder).context("Failed to initialize root folder")?;
    info!("Database: {}", db_path.display());

    let db_pool = feynman_common::db::init_database(&db_path)
        .await
        .context("Failed to open database")?;

    let cutoff = Utc::now() - Duration::days(ABANDONED_SESSION_DAYS);
    let pruned = feynman_tutor::db::review_sessions::prune_abandoned(&db_pool, cutoff)
        .await
        .context("Failed to prune abandoned review sessions")?;
    if pruned > 0 {
        info!(pruned, "Removed abandoned review sessions");
    }

    // Language model
    let api_key = feynman_tutor::config::resolve_llm_api_key(&db_pool, &toml_config)
        .await
        .context("Failed to resolve LLM API key")?;
    let api_key = Arc::new(RwLock::new(api_key));

    let client = OpenAiClient::new(&toml_config.llm, Arc::clone(&api_key))
        .context("Failed to build LLM client")?;
    info!(
        endpoint = client.endpoint(),
        model = %toml_config.llm.model,
        "Language model client ready"
    );
    let model: Arc<dyn LanguageModel> = Arc::new(client);

    let limits = ServiceLimits {
        max_lecture_chars: toml_config.ingest.max_lecture_chars,
        max_turns: toml_config.review.max_turns,
    };
    if let Some(max_turns) = limits.max_turns {
        info!(max_turns, "Review turn ceiling enabled");
    }

    let mut state = AppState::new(db_pool, model, api_key, limits);
    if let Some(path) = toml_path {
        state = state.with_toml_path(path);
    }

    let app = feynman_tutor::build_router(state);

    let port = args.port.or(toml_config.port).unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolve when Ctrl+C or SIGTERM arrives
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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
