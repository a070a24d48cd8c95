//! Application configuration.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Redis configuration.
    #[serde(default)]
    pub redis: RedisConfig,
    /// Cache TTL configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Gateway identity headers.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound for a single request, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Use Redis for the cache. When disabled an in-process store is used.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Key prefix for all Redis keys.
    #[serde(default = "default_redis_prefix")]
    pub prefix: String,
}

/// Cache TTLs, in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// TTL for single-entity entries such as `user:info:{id}`.
    #[serde(default = "default_detail_ttl")]
    pub detail_ttl_secs: u64,
    /// TTL for list and tree entries.
    #[serde(default = "default_list_ttl")]
    pub list_ttl_secs: u64,
    /// TTL for idempotency markers.
    #[serde(default = "default_idempotency_ttl")]
    pub idempotency_ttl_secs: u64,
}

/// Names of the headers the upstream gateway injects.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Header carrying the numeric user id.
    #[serde(default = "default_user_id_header")]
    pub user_id_header: String,
    /// Header carrying the username.
    #[serde(default = "default_username_header")]
    pub username_header: String,
    /// Header carrying the user role.
    #[serde(default = "default_role_header")]
    pub role_header: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Output format: `pretty` (default) or `json`.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

const fn default_request_timeout() -> u64 {
    30
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_true() -> bool {
    true
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_redis_prefix() -> String {
    "plaza".to_string()
}

const fn default_detail_ttl() -> u64 {
    1800
}

const fn default_list_ttl() -> u64 {
    300
}

const fn default_idempotency_ttl() -> u64 {
    5
}

fn default_user_id_header() -> String {
    "x-user-id".to_string()
}

fn default_username_header() -> String {
    "x-username".to_string()
}

fn default_role_header() -> String {
    "x-user-role".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: default_redis_url(),
            prefix: default_redis_prefix(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            detail_ttl_secs: default_detail_ttl(),
            list_ttl_secs: default_list_ttl(),
            idempotency_ttl_secs: default_idempotency_ttl(),
        }
    }
}

impl CacheConfig {
    /// TTL for single-entity entries.
    #[must_use]
    pub const fn detail_ttl(&self) -> Duration {
        Duration::from_secs(self.detail_ttl_secs)
    }

    /// TTL for list entries.
    #[must_use]
    pub const fn list_ttl(&self) -> Duration {
        Duration::from_secs(self.list_ttl_secs)
    }

    /// TTL for idempotency markers.
    #[must_use]
    pub const fn idempotency_ttl(&self) -> Duration {
        Duration::from_secs(self.idempotency_ttl_secs)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            user_id_header: default_user_id_header(),
            username_header: default_username_header(),
            role_header: default_role_header(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present) into the process environment
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `PLAZA_ENV`)
    /// 4. Environment variables with `PLAZA__` prefix, e.g. `PLAZA__DATABASE__URL`
    pub fn load() -> Result<Self, config::ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(config::ConfigError::Message(e.to_string()));
            }
        }

        let env = std::env::var("PLAZA_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PLAZA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("PLAZA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
