use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use thiserror::Error;
use url::Url;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8081";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a number, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },
    #[error("DB_HOST is not a valid host: '{0}'")]
    InvalidHost(String),
}

/// Settings for the credential and stats stores.
#[derive(Clone, Debug, PartialEq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    /// Full connection URL; takes precedence over the individual fields.
    pub url: Option<String>,
    pub max_connections: u32,
    pub password_cost: u32,
}

impl DatabaseConfig {
    /// Postgres URL built from the individual settings, unless `url` is set.
    /// Credentials are percent-encoded; the database name is taken as a path.
    pub fn connection_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }

        let invalid_host = || ConfigError::InvalidHost(self.host.clone());
        let mut url = Url::parse("postgres://localhost").map_err(|_| invalid_host())?;
        url.set_host(Some(&self.host)).map_err(|_| invalid_host())?;
        url.set_port(Some(self.port)).map_err(|_| invalid_host())?;
        let user = utf8_percent_encode(&self.user, NON_ALPHANUMERIC).to_string();
        url.set_username(&user).map_err(|_| invalid_host())?;
        if !self.password.is_empty() {
            let password = utf8_percent_encode(&self.password, NON_ALPHANUMERIC).to_string();
            url.set_password(Some(&password)).map_err(|_| invalid_host())?;
        }
        url.set_path(&self.name);
        url.query_pairs_mut().append_pair("sslmode", "disable");

        Ok(url.into())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub database: DatabaseConfig,
    pub listen_addr: String,
    pub rate_limit_per_second: u64,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database = DatabaseConfig {
            host: string("DB_HOST", "localhost"),
            port: parse_number(&lookup, "DB_PORT", 5432)?,
            name: string("DB_NAME", "postgres"),
            user: string("DB_USER", "postgres"),
            password: string("DB_PASSWORD", ""),
            url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            max_connections: parse_number(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            password_cost: parse_number(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        };

        Ok(Config {
            database,
            listen_addr: string("LISTEN_ADDR", DEFAULT_LISTEN_ADDR),
            rate_limit_per_second: parse_number(&lookup, "RATE_LIMIT_PER_SECOND", 10)?,
        })
    }
}

fn parse_number<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
    }
}
