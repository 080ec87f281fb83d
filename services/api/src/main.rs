use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod config;
mod error;
mod maintenance;
mod middleware;
mod models;
mod routes;
mod state;

use common::database::{DatabaseConfig, init_pool};
use packing::PackingService;
use packing::store::PgStore;
use tokio::net::TcpListener;

use crate::{config::ApiConfig, middleware::JwtVerifier, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ApiConfig::load()?;

    // Initialize logging; RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting packing API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let store = PgStore::new(pool);
    if config.run_migrations {
        store.migrate().await?;
    }

    let jwt = JwtVerifier::new(&config.jwt_public_key)?;
    let app_state = AppState::new(PackingService::new(store), jwt);

    // Keep the scheduler alive for the lifetime of the server
    let _scheduler = match &config.maintenance_schedule {
        Some(schedule) => Some(maintenance::start(app_state.service.clone(), schedule).await?),
        None => {
            info!("No maintenance schedule configured");
            None
        }
    };

    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("Packing API listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
