//! Configuration module
//!
//! Server, database, storage and ingestion settings, loaded from the environment
//! (and an optional `.env` file).

use std::env;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const SERVER_PORT: u16 = 8080;
const REQUEST_TIMEOUT_SECS: u64 = 30;
const HTTP_CONCURRENCY_LIMIT: usize = 1024;

/// Base configuration for the HTTP server and database pool
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
    pub request_timeout_secs: u64,
    pub http_concurrency_limit: usize,
    pub log_format: String,
}

/// Media ingestion configuration
#[derive(Clone, Debug)]
pub struct StudioConfig {
    pub base: BaseConfig,
    pub database_url: String,
    pub upload_directory: String,
    pub max_file_size_bytes: usize,
    /// Caller identity used for uploads that carry no `X-User-Email` header.
    pub default_acting_user: Option<String>,
    /// Seconds between orphan sweeps. 0 = disabled.
    pub orphan_sweep_interval_secs: u64,
    /// Minimum age of an unlinked blob before the sweeper removes it.
    pub orphan_grace_period_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<StudioConfig>);

impl Config {
    fn as_studio(&self) -> &StudioConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.as_studio().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = StudioConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_studio().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_studio().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_studio().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_studio().base.environment
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_studio().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_studio().base.db_timeout_seconds
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.as_studio().base.request_timeout_secs
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.as_studio().base.http_concurrency_limit
    }

    pub fn log_format(&self) -> &str {
        &self.as_studio().base.log_format
    }

    pub fn database_url(&self) -> &str {
        &self.as_studio().database_url
    }

    pub fn upload_directory(&self) -> &str {
        &self.as_studio().upload_directory
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.as_studio().max_file_size_bytes
    }

    pub fn default_acting_user(&self) -> Option<&str> {
        self.as_studio().default_acting_user.as_deref()
    }

    pub fn orphan_sweep_interval_secs(&self) -> u64 {
        self.as_studio().orphan_sweep_interval_secs
    }

    pub fn orphan_grace_period_secs(&self) -> u64 {
        self.as_studio().orphan_grace_period_secs
    }
}

impl StudioConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        const MAX_FILE_SIZE_BYTES: usize = 1024 * 1024;
        const UPLOAD_DIRECTORY: &str = "./uploads";
        const ORPHAN_SWEEP_INTERVAL_SECS: u64 = 3600;
        const ORPHAN_GRACE_PERIOD_SECS: u64 = 900;

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(REQUEST_TIMEOUT_SECS)
                .max(1),
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT)
                .max(1),
            log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        };

        Ok(StudioConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            upload_directory: env::var("UPLOAD_DIRECTORY")
                .unwrap_or_else(|_| UPLOAD_DIRECTORY.to_string()),
            max_file_size_bytes: env::var("MAX_FILE_SIZE_BYTES")
                .unwrap_or_else(|_| MAX_FILE_SIZE_BYTES.to_string())
                .parse::<usize>()
                .unwrap_or(MAX_FILE_SIZE_BYTES),
            default_acting_user: env::var("DEFAULT_ACTING_USER")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            orphan_sweep_interval_secs: env::var("ORPHAN_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(ORPHAN_SWEEP_INTERVAL_SECS),
            orphan_grace_period_secs: env::var("ORPHAN_GRACE_PERIOD_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(ORPHAN_GRACE_PERIOD_SECS),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.upload_directory.trim().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_DIRECTORY cannot be empty"));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_FILE_SIZE_BYTES must be greater than zero"
            ));
        }

        if self.base.db_max_connections == 0 {
            return Err(anyhow::anyhow!(
                "DB_MAX_CONNECTIONS must be greater than zero"
            ));
        }

        // A blob younger than the request deadline may still be about to be linked.
        if self.orphan_grace_period_secs <= self.base.request_timeout_secs {
            return Err(anyhow::anyhow!(
                "ORPHAN_GRACE_PERIOD_SECS ({}) must be greater than REQUEST_TIMEOUT_SECS ({})",
                self.orphan_grace_period_secs,
                self.base.request_timeout_secs
            ));
        }

        Ok(())
    }
}
