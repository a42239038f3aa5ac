//! Application configuration, read once from the environment at startup.

use std::env;
use std::path::PathBuf;

use axum::http::HeaderValue;

/// Secret used when `JWT_SECRET` is unset. Refused in production.
pub const DEFAULT_JWT_SECRET: &str = "default-jwt-secret-change-in-production";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a secure, unique value in production")]
    InsecureJwtSecret,

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct DbSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    /// `None` runs the service on the in-memory store.
    pub database: Option<DbSettings>,
    pub jwt_secret: String,
    pub upload_dir: PathBuf,
    /// Prefix for URLs handed out by URL-mode image uploads.
    pub public_base_url: String,
    pub site_url: String,
    pub site_title: String,
    pub allowed_origins: Vec<HeaderValue>,
    pub log_level: String,
    pub log_dir: PathBuf,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name,
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

/// ALLOWED_ORIGINS (comma-separated) wins over FRONTEND_ORIGIN; local dev
/// origins are used when neither is set.
fn allowed_origins() -> Vec<HeaderValue> {
    let from_list = env::var("ALLOWED_ORIGINS").ok().and_then(|s| {
        let origins: Vec<HeaderValue> = s
            .split(',')
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();
        if origins.is_empty() {
            None
        } else {
            Some(origins)
        }
    });

    from_list
        .or_else(|| {
            env::var("FRONTEND_ORIGIN")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|origin| vec![origin])
        })
        .unwrap_or_else(|| {
            vec![
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
            ]
        })
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = var_or("ENVIRONMENT", "development");
        let is_production = environment == "production";

        let jwt_secret = var_or("JWT_SECRET", DEFAULT_JWT_SECRET);
        if is_production && (jwt_secret.is_empty() || jwt_secret == DEFAULT_JWT_SECRET) {
            return Err(ConfigError::InsecureJwtSecret);
        }

        let database = match env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => Some(DbSettings {
                url,
                max_connections: parsed_or("DB_POOL_MAX", 10)?,
                min_connections: parsed_or("DB_POOL_MIN", 2)?,
                idle_timeout_secs: parsed_or("DB_IDLE_TIMEOUT", 300)?,
            }),
            _ => None,
        };

        let host = var_or("HOST", "127.0.0.1");
        let port = parsed_or("PORT", 3001u16)?;
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", host, port));

        Ok(Self {
            host,
            port,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| {
                if is_production { "info" } else { "debug" }.to_string()
            }),
            environment,
            database,
            jwt_secret,
            upload_dir: PathBuf::from(var_or("UPLOAD_DIR", "uploads")),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            site_url: var_or("SITE_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            site_title: var_or("SITE_TITLE", "DevFolio"),
            allowed_origins: allowed_origins(),
            log_dir: PathBuf::from(var_or("LOG_DIR", "logs")),
        })
    }

    /// Configuration for tests: memory store, fixed secret, uploads under `upload_dir`.
    pub fn for_tests(upload_dir: PathBuf) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            database: None,
            jwt_secret: "test-secret".to_string(),
            upload_dir,
            public_base_url: "http://localhost:3001".to_string(),
            site_url: "http://localhost:3000".to_string(),
            site_title: "DevFolio".to_string(),
            allowed_origins: vec![HeaderValue::from_static("http://localhost:3000")],
            log_level: "debug".to_string(),
            log_dir: PathBuf::from("logs"),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
