//! Server configuration read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `DATABASE_URL` | `postgres://localhost/lingodir` |
//! | `HOST` | `0.0.0.0` |
//! | `PORT` | `3000` |
//! | `RATE_LIMIT_ENABLED` | `false` |
//! | `RATE_LIMIT_REQUESTS` | `100` |
//! | `RATE_LIMIT_PERIOD_SECS` | `60` |
//! | `ALLOWED_ORIGINS` | `http://localhost:3000,http://localhost:5173` |
//! | `MAX_BODY_BYTES` | `1048576` |
//! | `DB_MAX_CONNECTIONS` | `10` |
//! | `DB_MIN_CONNECTIONS` | `1` |
//! | `DB_CONNECT_TIMEOUT_SECS` | `30` |
//! | `DB_IDLE_TIMEOUT_SECS` | `600` |
//! | `DB_MAX_LIFETIME_SECS` | `1800` (`0` = no limit) |
//!
//! The `DB_*` variables fill [`ServerConfig::pool`] through
//! [`PoolConfig::from_env`].

use std::str::FromStr;

use axum::http::HeaderValue;
use lingodir_db::PoolConfig;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/lingodir";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Requests allowed per period.
    pub requests: u32,
    pub period_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            requests: 100,
            period_secs: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub rate_limit: RateLimitConfig,
    pub allowed_origins: Vec<HeaderValue>,
    pub max_body_bytes: usize,
    pub pool: PoolConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            rate_limit: RateLimitConfig::default(),
            allowed_origins: parse_allowed_origins(DEFAULT_ALLOWED_ORIGINS),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            pool: PoolConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port),
            rate_limit: RateLimitConfig {
                enabled: std::env::var("RATE_LIMIT_ENABLED")
                    .map(|v| parse_flag(&v))
                    .unwrap_or(defaults.rate_limit.enabled),
                requests: env_or("RATE_LIMIT_REQUESTS", defaults.rate_limit.requests),
                period_secs: env_or("RATE_LIMIT_PERIOD_SECS", defaults.rate_limit.period_secs),
            },
            allowed_origins: parse_allowed_origins(
                &std::env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string()),
            ),
            max_body_bytes: env_or("MAX_BODY_BYTES", defaults.max_body_bytes),
            pool: PoolConfig::from_env(),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> bool {
    value == "true" || value == "1"
}

/// Parse a comma-separated origin list. Invalid entries are dropped with a
/// warning; an empty list falls back to the defaults.
pub fn parse_allowed_origins(origins_str: &str) -> Vec<HeaderValue> {
    if origins_str.trim().is_empty() {
        return parse_allowed_origins(DEFAULT_ALLOWED_ORIGINS);
    }

    origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}
