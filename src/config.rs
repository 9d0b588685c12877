//! Runtime configuration read from the environment (and `.env` in development)

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_CACHE_WARM_INTERVAL_SECS: u64 = 10 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub database_max_connections: u32,
    pub cache_warm_interval: Duration,
    pub static_dir: String,
    /// Currency code attached to every amount in API responses
    pub currency: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
            cache_warm_interval: Duration::from_secs(DEFAULT_CACHE_WARM_INTERVAL_SECS),
            static_dir: "static".to_string(),
            currency: "USD".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .context("DATABASE_URL must be set")?;

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port),
            database_max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            ),
            cache_warm_interval: Duration::from_secs(
                parse_or(
                    &lookup,
                    "CACHE_WARM_INTERVAL_SECS",
                    DEFAULT_CACHE_WARM_INTERVAL_SECS,
                )
                .max(1),
            ),
            static_dir: lookup("STATIC_DIR").unwrap_or(defaults.static_dir),
            currency: lookup("CURRENCY")
                .map(|c| c.trim().to_ascii_uppercase())
                .filter(|c| !c.is_empty())
                .unwrap_or(defaults.currency),
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid {} value {:?}, using default {}", key, raw, default);
            default
        }),
        None => default,
    }
}
