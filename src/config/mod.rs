//! Configuration module for the jokes server.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which storage backend serves the jokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    File,
    Sqlite,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "file" => Ok(StorageBackend::File),
            "sqlite" => Ok(StorageBackend::Sqlite),
            _ => Err("expected one of memory, file, sqlite".to_string()),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err("expected pretty or json".to_string()),
        }
    }
}

/// A configuration value that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}={:?}: {}", self.key, self.value, self.reason)
    }
}

impl std::error::Error for ConfigError {}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    pub storage: StorageBackend,
    /// JSON file used by the file backend
    pub data_path: PathBuf,
    /// SQLite database used by the sqlite backend
    pub db_path: PathBuf,
    /// Optional JSON array of jokes loaded at startup
    pub seed_path: Option<PathBuf>,
    /// Deadline for store access and rendering of one request
    pub request_timeout: Duration,
    pub cache_enabled: bool,
    /// TTL applied when the by-id path populates the cache
    pub cache_ttl: Duration,
    /// Interval of the cache expiry sweep; zero disables it
    pub cache_sweep_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let bind_addr = parse("JOKES_BIND_ADDR", get("JOKES_BIND_ADDR", "127.0.0.1:8080"))?;
        let log_level = get("JOKES_LOG_LEVEL", "info");
        let log_format = parse("JOKES_LOG_FORMAT", get("JOKES_LOG_FORMAT", "pretty"))?;
        let storage = parse("JOKES_STORAGE", get("JOKES_STORAGE", "memory"))?;
        let data_path = get("JOKES_DATA_PATH", "./data/jokes.json").into();
        let db_path = get("JOKES_DB_PATH", "./data/jokes.sqlite").into();
        let seed_path = lookup("JOKES_SEED_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        let request_timeout = Duration::from_millis(parse(
            "JOKES_REQUEST_TIMEOUT_MS",
            get("JOKES_REQUEST_TIMEOUT_MS", "2000"),
        )?);
        let cache_enabled = parse_bool("JOKES_CACHE_ENABLED", get("JOKES_CACHE_ENABLED", "true"))?;
        let cache_ttl = Duration::from_secs(parse(
            "JOKES_CACHE_TTL_SECS",
            get("JOKES_CACHE_TTL_SECS", "20"),
        )?);
        let cache_sweep_interval = Duration::from_secs(parse(
            "JOKES_CACHE_SWEEP_SECS",
            get("JOKES_CACHE_SWEEP_SECS", "60"),
        )?);

        Ok(Self {
            bind_addr,
            log_level,
            log_format,
            storage,
            data_path,
            db_path,
            seed_path,
            request_timeout,
            cache_enabled,
            cache_ttl,
            cache_sweep_interval,
        })
    }
}

fn parse<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError {
        key,
        reason: e.to_string(),
        value,
    })
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError {
            key,
            value,
            reason: "expected a boolean".to_string(),
        }),
    }
}
