use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::{info, warn};

use learnhub::logging::init_logging;
use learnhub::router::init_router;
use learnhub::state::AppState;
use learnhub_config::AppConfig;
use learnhub_core::errors::expose_internal_errors;
use learnhub_db::{PgStore, init_db_pool, run_migrations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_logging(config.environment, &config.server.log_level);
    for warning in config.warnings() {
        warn!("{}", warning);
    }
    expose_internal_errors(!config.environment.is_production());

    let pool = init_db_pool(&config.database)
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let state = AppState::new(Arc::new(PgStore::new(pool)), &config);
    state
        .roles
        .initialize_default_roles()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize roles: {}", e))?;

    let app = init_router(state);

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(address = %address, environment = %config.environment, "Server running");
    axum::serve(listener, app).await?;
    Ok(())
}
