use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use learnhub_config::DatabaseConfig;

use crate::error::StoreError;

/// Connects a PostgreSQL pool with the configured size and timeouts.
///
/// The pool is cheaply cloneable and should be created once at startup.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(Some(config.idle_timeout))
        .connect(&config.url)
        .await?;

    info!(
        max_connections = config.max_connections,
        "Database pool initialized"
    );

    Ok(pool)
}

/// Applies the embedded migrations. Already-applied migrations are skipped.
pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
