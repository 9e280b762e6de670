//! Service configuration from environment variables (`.env` is loaded by the binary).

use crate::error::ConfigError;
use std::str::FromStr;
use std::time::Duration;

/// Where movies are stored and, for PostgreSQL, how directors are laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageLayout {
    /// Process-local map; nothing survives a restart.
    Memory,
    /// `movies.director` holds the director's display name.
    Flat,
    /// Directors live in their own table, referenced by `movies.director_id`.
    Normalized,
}

impl StorageLayout {
    pub fn uses_database(self) -> bool {
        !matches!(self, StorageLayout::Memory)
    }
}

impl FromStr for StorageLayout {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StorageLayout::Memory),
            "flat" => Ok(StorageLayout::Flat),
            "normalized" => Ok(StorageLayout::Normalized),
            _ => Err(ConfigError::UnknownLayout(s.to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    /// Deadline applied to every database call.
    pub db_timeout: Duration,
    pub layout: StorageLayout,
    /// Create the database and tables at startup if they are missing.
    pub ensure_schema: bool,
    /// Comma-separated bootstrap servers. Events are only logged when unset.
    pub kafka_brokers: Option<String>,
    pub kafka_topic: String,
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: "postgres://localhost/movies".into(),
            bind_addr: "0.0.0.0:8080".into(),
            db_max_connections: 5,
            db_timeout: Duration::from_millis(5000),
            layout: StorageLayout::Flat,
            ensure_schema: true,
            kafka_brokers: None,
            kafka_topic: "movies".into(),
            max_body_bytes: 64 * 1024,
        }
    }
}

impl AppConfig {
    /// Read config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read config through an arbitrary lookup; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = AppConfig::default();

        if let Some(v) = get("DATABASE_URL") {
            cfg.database_url = v;
        }
        if let Some(v) = get("BIND_ADDR") {
            cfg.bind_addr = v;
        }
        if let Some(v) = get("DB_MAX_CONNECTIONS") {
            cfg.db_max_connections = parse_number("DB_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = get("DB_TIMEOUT_MS") {
            cfg.db_timeout = Duration::from_millis(parse_number("DB_TIMEOUT_MS", &v)?);
        }
        if let Some(v) = get("MOVIES_LAYOUT") {
            cfg.layout = v.parse()?;
        }
        if let Some(v) = get("MOVIES_ENSURE_SCHEMA") {
            cfg.ensure_schema = parse_bool("MOVIES_ENSURE_SCHEMA", &v)?;
        }
        cfg.kafka_brokers = get("KAFKA_BROKERS");
        if let Some(v) = get("KAFKA_TOPIC") {
            cfg.kafka_topic = v;
        }
        if let Some(v) = get("MAX_BODY_BYTES") {
            cfg.max_body_bytes = parse_number("MAX_BODY_BYTES", &v)?;
        }
        Ok(cfg)
    }
}

fn parse_number<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}
