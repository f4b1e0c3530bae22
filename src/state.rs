use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::{PasswordHasher, TokenService};
use crate::config::AppConfig;
use crate::database::{ReportRepository, UserRepository};
use crate::media::MediaStore;

/// Shared, read-only services handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: SqlitePool,
    pub tokens: Arc<TokenService>,
    pub passwords: PasswordHasher,
    pub media: Arc<MediaStore>,
}

impl AppState {
    pub fn new(config: AppConfig, pool: SqlitePool) -> Self {
        let tokens = TokenService::new(config.security.jwt_secret.as_bytes(), config.token_ttl());
        let passwords = PasswordHasher::new(config.security.password_cost);
        let media = MediaStore::new(&config.media);
        Self {
            config: Arc::new(config),
            pool,
            tokens: Arc::new(tokens),
            passwords,
            media: Arc::new(media),
        }
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(self.pool.clone())
    }
}
