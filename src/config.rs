use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::AppError;
use crate::generator::GeneratorConfig;

const DEFAULT_DATABASE_URL: &str = "sqlite://timetable.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_GENERATOR_TIMEOUT_SECS: u64 = 60;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub generator: Option<GeneratorConfig>,
    /// `None` disables the periodic generation run.
    pub auto_generate_interval_secs: Option<u64>,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| AppError::Validation(format!("BIND_ADDR is not a socket address: {}", bind_raw)))?;

        let max_connections = parse_number(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS")?.unwrap_or(5);

        let timeout_secs = parse_number(get("GENERATOR_TIMEOUT_SECS"), "GENERATOR_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_GENERATOR_TIMEOUT_SECS);
        let generator = get("GENERATOR_URL").map(|url| GeneratorConfig {
            url,
            timeout: Duration::from_secs(timeout_secs),
        });

        let auto_generate_interval_secs =
            parse_number::<u64>(get("AUTO_GENERATE_INTERVAL_SECS"), "AUTO_GENERATE_INTERVAL_SECS")?
                .filter(|secs| *secs > 0);

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
            generator,
            auto_generate_interval_secs,
        })
    }
}

fn parse_number<T: std::str::FromStr>(raw: Option<String>, key: &str) -> Result<Option<T>, AppError> {
    raw.map(|v| {
        v.parse::<T>()
            .map_err(|_| AppError::Validation(format!("{} must be a number, got {}", key, v)))
    })
    .transpose()
}
