//! webtools API server
//!
//! Run with: cargo run -p webtools-web

use std::net::SocketAddr;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use webtools_config::Config;
use webtools_db::Database;
use webtools_web::router::build_router;
use webtools_web::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting webtools server...");
    let config = Config::load().context("loading configuration")?;
    info!(host = %config.ollama.host, model = %config.ollama.model, "Ollama backend");

    let mut state = AppState::from_config(&config);
    let mut database = None;
    if config.database.enabled {
        match connect_database(&config).await {
            Ok(db) => {
                state = state.with_database(&db);
                database = Some(db);
            }
            Err(e) => warn!(error = %e, "Database unavailable, history and prompts are disabled"),
        }
    } else {
        info!("Database disabled by configuration");
    }

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port)
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind))?;
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = database {
        db.close().await;
    }
    Ok(())
}

async fn connect_database(config: &Config) -> webtools_db::Result<Database> {
    let db = Database::connect(&config.database).await?;
    db.initialize().await?;
    Ok(db)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
