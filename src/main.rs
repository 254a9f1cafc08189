use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use edu_erp_api::app::{app_with_config, AppState};
use edu_erp_api::config::config;
use edu_erp_api::database::{DatabaseManager, MemoryStore, PgStore, Store};
use edu_erp_api::is_production;

#[derive(Parser)]
#[command(name = "edu-erp-api")]
#[command(about = "Multi-tenant education administration API server")]
#[command(version)]
struct Args {
    #[arg(long, help = "Bind address (overrides SERVER_HOST)")]
    host: Option<String>,

    #[arg(long, help = "Listen port (overrides PORT / ERP_API_PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Run on the in-memory store even if DATABASE_URL is set")]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the config singleton is first touched
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("edu_erp_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let config = config();
    tracing::info!("Starting Education ERP API in {:?} mode", config.environment);

    let store: Arc<dyn Store> = match (&config.database.url, args.memory) {
        (Some(_), false) => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to database")?;
            Arc::new(PgStore::new(pool))
        }
        _ => {
            if is_production!() {
                anyhow::bail!("DATABASE_URL is required in production; refusing to start on the in-memory store");
            }
            tracing::warn!("No DATABASE_URL configured (or --memory given); using the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(store, &config.tenant);
    let app = app_with_config(state, config);

    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install ctrl-c handler: {}", e);
        std::future::pending::<()>().await;
    }
}
