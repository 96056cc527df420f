use std::env;
use std::net::SocketAddr;

use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://university_library.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    /// Reads `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS` and `BIND_ADDR`,
    /// falling back to defaults for unset variables.
    pub fn new_from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(value) => value
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid { name: "DATABASE_MAX_CONNECTIONS", value })?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::Invalid { name: "BIND_ADDR", value: bind_addr.clone() })?;

        Ok(Self {
            database_url,
            max_connections,
            bind_addr,
        })
    }
}
