use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Secret shipped for local development only. Production refuses to start with it.
pub const DEVELOPMENT_SECRET: &str = "your-super-secret-jwt-key-change-this";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub media: MediaConfig,
    pub contact: ContactConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub password_cost: u32,
    pub cookie_secure: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub upload_dir: String,
    pub max_image_bytes: usize,
    pub max_video_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
    pub admin_email: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SECRET_KEY must not be empty")]
    EmptySecret,

    #[error("SECRET_KEY must be set explicitly in production")]
    DefaultSecretInProduction,

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }

        // Security overrides
        if let Ok(v) = env::var("SECRET_KEY") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("ACCESS_TOKEN_EXPIRE_MINUTES") {
            self.security.token_ttl_minutes = v.parse().unwrap_or(self.security.token_ttl_minutes);
        }
        if let Ok(v) = env::var("PASSWORD_HASH_COST") {
            self.security.password_cost = v.parse().unwrap_or(self.security.password_cost);
        }
        if let Ok(v) = env::var("COOKIE_SECURE") {
            self.security.cookie_secure = v.parse().unwrap_or(self.security.cookie_secure);
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Media overrides
        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.media.upload_dir = v;
        }
        if let Ok(v) = env::var("MAX_IMAGE_SIZE") {
            self.media.max_image_bytes = v.parse().unwrap_or(self.media.max_image_bytes);
        }
        if let Ok(v) = env::var("MAX_VIDEO_SIZE") {
            self.media.max_video_bytes = v.parse().unwrap_or(self.media.max_video_bytes);
        }

        if let Ok(v) = env::var("ADMIN_EMAIL") {
            self.contact.admin_email = v;
        }

        self
    }

    /// Checks invariants that the defaults alone cannot guarantee.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if self.environment == Environment::Production && self.security.jwt_secret == DEVELOPMENT_SECRET {
            return Err(ConfigError::DefaultSecretInProduction);
        }
        if self.security.token_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                field: "ACCESS_TOKEN_EXPIRE_MINUTES",
                reason: "must be positive".to_string(),
            });
        }
        if !(4..=31).contains(&self.security.password_cost) {
            return Err(ConfigError::Invalid {
                field: "PASSWORD_HASH_COST",
                reason: format!("{} is outside 4..=31", self.security.password_cost),
            });
        }
        if self.media.max_image_bytes == 0 || self.media.max_video_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "MAX_IMAGE_SIZE/MAX_VIDEO_SIZE",
                reason: "ceilings must be non-zero".to_string(),
            });
        }
        Ok(())
    }

    /// Token lifetime as a duration, used both for signing and for the cookie max-age.
    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.security.token_ttl_minutes)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: "sqlite://./app_v2.db".to_string(),
                max_connections: 5,
            },
            security: SecurityConfig {
                jwt_secret: DEVELOPMENT_SECRET.to_string(),
                token_ttl_minutes: 60 * 24 * 7, // 7 days
                password_cost: bcrypt::DEFAULT_COST,
                cookie_secure: false,
                cors_origins: vec!["http://localhost:5173".to_string(), "http://localhost:3000".to_string()],
            },
            media: MediaConfig {
                upload_dir: "./uploads".to_string(),
                max_image_bytes: 10 * 1024 * 1024, // 10MB
                max_video_bytes: 50 * 1024 * 1024, // 50MB
            },
            contact: ContactConfig {
                admin_email: "admin@example.com".to_string(),
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 10;
        config.security.cookie_secure = true;
        config.security.cors_origins = vec!["https://staging.example.com".to_string()];
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 20;
        // No usable default secret: SECRET_KEY has to come from the environment.
        config.security.jwt_secret = String::new();
        config.security.cookie_secure = true;
        config.security.cors_origins = vec!["https://app.example.com".to_string()];
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.security.token_ttl_minutes, 10080);
        assert_eq!(config.media.max_image_bytes, 10_485_760);
        assert_eq!(config.media.max_video_bytes, 52_428_800);
        assert!(!config.security.cookie_secure);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_production_config_requires_secret() {
        let mut config = AppConfig::production();
        assert!(config.security.cookie_secure);
        assert!(matches!(config.validate(), Err(ConfigError::EmptySecret)));

        config.security.jwt_secret = DEVELOPMENT_SECRET.to_string();
        assert!(matches!(config.validate(), Err(ConfigError::DefaultSecretInProduction)));

        config.security.jwt_secret = "a-real-deployment-secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_hash_cost() {
        let mut config = AppConfig::development();
        config.security.password_cost = 2;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn token_ttl_matches_minutes() {
        let config = AppConfig::development();
        assert_eq!(config.token_ttl().num_seconds(), 10080 * 60);
    }
}
