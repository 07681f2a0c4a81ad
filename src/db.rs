use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::AppConfig;

pub async fn build_pool(config: &AppConfig) -> Result<PgPool, Box<dyn std::error::Error>> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or("DATABASE_URL is not set")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_pool_max_connections)
        .min_connections(config.db_pool_min_connections)
        .acquire_timeout(Duration::from_secs(config.db_pool_acquire_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.db_pool_idle_timeout_seconds))
        .connect(database_url)
        .await?;

    if config.run_migrations {
        sqlx::migrate!().run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}
