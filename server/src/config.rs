//! Process configuration, read once from the environment at startup.

use std::env;
use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_POOL_SIZE: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DATABASE_URL must be set")]
    MissingDatabaseUrl,

    #[error("Invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub pool_size: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        let bind_addr = parse_or("BIND_ADDR", lookup("BIND_ADDR"), DEFAULT_BIND_ADDR)?;

        let pool_size = match lookup("DB_POOL_SIZE") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid {
                    name: "DB_POOL_SIZE",
                    value: raw,
                })?,
            None => DEFAULT_POOL_SIZE,
        };

        Ok(Config {
            database_url,
            bind_addr,
            pool_size,
        })
    }
}

fn parse_or(
    name: &'static str,
    raw: Option<String>,
    default: &str,
) -> Result<SocketAddr, ConfigError> {
    let value = raw.unwrap_or_else(|| default.to_string());
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}
