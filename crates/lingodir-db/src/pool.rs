//! PostgreSQL pool for the directory store.
//!
//! Sizing and timeouts come from the environment (see [`PoolConfig::from_env`]);
//! the API server and the `lingodir-import` loader read the same variables.
//! Pool events log under `subsystem = "database"`, `component = "pool"`
//! with the [`lingodir_core::logging`] field names.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, warn};

use lingodir_core::{Error, Result};

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800;

/// Pool sizing and connection timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    /// Connections kept open while idle. Never above `max_connections`.
    pub min_connections: u32,
    /// How long a unit of work waits for a free connection.
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    /// `None` keeps connections until they fail or idle out.
    pub max_lifetime: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            max_lifetime: Some(Duration::from_secs(DEFAULT_MAX_LIFETIME_SECS)),
        }
    }
}

impl PoolConfig {
    /// Read pool settings from the process environment.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `DB_MAX_CONNECTIONS` | 10 |
    /// | `DB_MIN_CONNECTIONS` | 1 |
    /// | `DB_CONNECT_TIMEOUT_SECS` | 30 |
    /// | `DB_IDLE_TIMEOUT_SECS` | 600 |
    /// | `DB_MAX_LIFETIME_SECS` | 1800 (`0` disables the limit) |
    ///
    /// Values that do not parse are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PoolConfig::from_env`], with the variables supplied by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(n) = read_u64(&lookup, "DB_MAX_CONNECTIONS", 1) {
            config.max_connections = u32::try_from(n).unwrap_or(u32::MAX);
        }
        if let Some(n) = read_u64(&lookup, "DB_MIN_CONNECTIONS", 0) {
            config.min_connections = u32::try_from(n).unwrap_or(u32::MAX);
        }
        if let Some(secs) = read_u64(&lookup, "DB_CONNECT_TIMEOUT_SECS", 1) {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read_u64(&lookup, "DB_IDLE_TIMEOUT_SECS", 1) {
            config.idle_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read_u64(&lookup, "DB_MAX_LIFETIME_SECS", 0) {
            config.max_lifetime = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if config.min_connections > config.max_connections {
            warn!(
                subsystem = "database",
                component = "pool",
                min_connections = config.min_connections,
                max_connections = config.max_connections,
                "DB_MIN_CONNECTIONS exceeds DB_MAX_CONNECTIONS, clamping"
            );
            config.min_connections = config.max_connections;
        }
        config
    }
}

fn read_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, min: u64) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(n) if n >= min => Some(n),
        _ => {
            warn!(
                subsystem = "database",
                component = "pool",
                key,
                value = %raw,
                "Ignoring invalid pool setting"
            );
            None
        }
    }
}

/// Connect with the default [`PoolConfig`].
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    create_pool_with_config(database_url, PoolConfig::default()).await
}

pub async fn create_pool_with_config(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    let start = Instant::now();

    info!(
        subsystem = "database",
        component = "pool",
        op = "create",
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        connect_timeout_secs = config.connect_timeout.as_secs(),
        idle_timeout_secs = config.idle_timeout.as_secs(),
        max_lifetime_secs = config.max_lifetime.map(|d| d.as_secs()).unwrap_or(0),
        "Opening directory pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "database",
        component = "pool",
        op = "established",
        pool_size = pool.size(),
        pool_idle = pool.num_idle(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Directory pool ready"
    );
    Ok(pool)
}

/// Log pool occupancy; called from the health check.
pub fn log_pool_metrics(pool: &PgPool) {
    let size = pool.size();
    let idle = pool.num_idle();

    debug!(
        subsystem = "database",
        component = "pool",
        op = "metrics",
        pool_size = size,
        pool_idle = idle,
        "Pool occupancy"
    );

    if idle == 0 && size > 0 {
        warn!(
            subsystem = "database",
            component = "pool",
            pool_size = size,
            "Every pooled connection is busy"
        );
    }
}
