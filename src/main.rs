use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use demographics_api::config::AppConfig;
use demographics_api::database::{DatabaseManager, PgIdentityStore, PgRecordStore};
use demographics_api::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "demographics-api", version, about = "Demographic records HTTP API")]
struct Args {
    /// Listen port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// PostgreSQL connection string (overrides DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    /// Use in-memory stores even when a database URL is configured
    #[arg(long, env = "IN_MEMORY_STORE")]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and friends.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(url) = args.database_url {
        config.database.url = Some(url);
    }
    info!("Starting Demographics API in {:?} mode", config.environment);

    let config = Arc::new(config);
    let state = match config.database.url.as_deref() {
        Some(url) if !args.in_memory => {
            let pool = DatabaseManager::connect(&config.database, url)
                .await
                .context("database connection failed")?;
            AppState::new(
                config.clone(),
                Arc::new(PgRecordStore::new(pool.clone())),
                Arc::new(PgIdentityStore::new(pool)),
            )
        }
        _ => {
            if config.is_production() {
                anyhow::bail!("DATABASE_URL is required in production");
            }
            warn!("No database configured; records and accounts are kept in memory only");
            AppState::in_memory(config.clone())
        }
    };

    let app = build_router(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Demographics API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
