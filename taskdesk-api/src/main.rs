//! # TaskDesk API Server
//!
//! REST API for the TaskDesk task tracker: login, user administration and
//! task CRUD with Admin/User access control.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) STORAGE_BACKEND=memory cargo run -p taskdesk-api
//! ```

use anyhow::Context;
use std::sync::Arc;
use taskdesk_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat, StorageBackend},
    seed,
};
use taskdesk_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    store::{MemoryStore, PgStore, TaskStore, UserStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "taskdesk_api=debug,taskdesk_shared=debug,tower_http=debug";

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = ?config.database.backend,
        "TaskDesk API Server starting"
    );

    match config.database.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            serve(Arc::new(MemoryStore::new()), config).await
        }
        StorageBackend::Postgres => {
            let url = config
                .database
                .url
                .clone()
                .context("DATABASE_URL environment variable is required")?;
            let pool = create_pool(DatabaseConfig {
                url,
                max_connections: config.database.max_connections,
                ..Default::default()
            })
            .await
            .context("failed to connect to database")?;
            run_migrations(&pool).await?;

            let result = serve(Arc::new(PgStore::new(pool.clone())), config).await;
            close_pool(pool).await;
            result
        }
    }
}

async fn serve<S>(store: Arc<S>, config: Config) -> anyhow::Result<()>
where
    S: UserStore + TaskStore + 'static,
{
    if config.seed_demo_data {
        seed::seed_demo_data(store.as_ref()).await?;
    }

    let addr = config.bind_address();
    let app = build_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
