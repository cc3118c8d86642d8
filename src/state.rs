use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::db;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db_pool: Option<PgPool>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn build(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let db_pool = match &config.database_url {
            Some(url) => Some(db::build_pool(&config, url)?),
            None => None,
        };
        let sessions = SessionStore::new(&config);
        Ok(Self {
            config: Arc::new(config),
            db_pool,
            sessions,
        })
    }

    pub fn require_db(&self) -> AppResult<&PgPool> {
        self.db_pool.as_ref().ok_or_else(|| {
            AppError::Dependency("Database is not configured. Set DATABASE_URL.".to_string())
        })
    }
}
