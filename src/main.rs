use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use saleboard::config::Config;
use saleboard::token::TokenService;
use saleboard::AppState;

#[derive(Parser, Debug)]
#[command(name = "saleboard")]
#[command(author, version, about = "A small single-admin product dashboard backend", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "saleboard.toml")]
    config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,

    /// Signing secret for session tokens (overrides the config file)
    #[arg(long, env = "SALEBOARD_TOKEN_SECRET")]
    token_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(&cli.config)?;
    if let Some(secret) = cli.token_secret {
        config.auth.token_secret = secret;
    }

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting saleboard v{}", env!("CARGO_PKG_VERSION"));

    // A server that cannot sign session tokens must never come up.
    config.validate()?;

    std::fs::create_dir_all(&config.server.data_dir)?;

    // Initialize database and seed the single admin identity
    let db = saleboard::db::init(&config.database_url()).await?;
    saleboard::db::ensure_admin(&db, &config.auth.admin_email, &config.auth.admin_password)
        .await?;

    let tokens = TokenService::new(&config.auth.token_secret);
    let state = Arc::new(AppState::new(config.clone(), db, tokens));

    let app = saleboard::api::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
