use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db_pool: PgPool,
}

impl AppState {
    pub fn new(config: AppConfig, db_pool: PgPool) -> Self {
        Self {
            config: Arc::new(config),
            db_pool,
        }
    }
}
