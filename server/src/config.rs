//! Process configuration, read once at startup from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `APP_ENV` | `development` |
//! | `HOST` | `127.0.0.1` |
//! | `PORT` | `3001` |
//! | `DATABASE_URL` | unset: in-memory store |
//! | `LOG_LEVEL` | unset: `RUST_LOG`, then `info` |
//! | `CORS_ORIGIN` | `http://localhost:3000` |

use std::{fmt, str::FromStr};

use axum::http::HeaderValue;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

impl ConfigError {
    fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            message: message.into(),
        }
    }
}

/// Deployment mode. Only `Production` changes behavior: it hides internal
/// error detail from 500 responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(format!(
                "`{other}` is not one of development, production, test"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    /// SQLite URL. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub cors_origin: HeaderValue,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_url: None,
            log_level: None,
            cors_origin: HeaderValue::from_static(DEFAULT_CORS_ORIGIN),
        }
    }
}

impl AppConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let environment = match get("APP_ENV") {
            Some(raw) => raw
                .parse::<Environment>()
                .map_err(|message| ConfigError::invalid("APP_ENV", message))?,
            None => defaults.environment,
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid("PORT", format!("`{raw}`: {e}")))?,
            None => defaults.port,
        };

        let log_level = match get("LOG_LEVEL") {
            Some(raw) if LOG_LEVELS.contains(&raw.as_str()) => Some(raw),
            Some(raw) => {
                return Err(ConfigError::invalid(
                    "LOG_LEVEL",
                    format!("`{raw}` is not one of {}", LOG_LEVELS.join(", ")),
                ))
            }
            None => None,
        };

        let cors_origin = match get("CORS_ORIGIN") {
            Some(raw) => HeaderValue::from_str(&raw)
                .map_err(|e| ConfigError::invalid("CORS_ORIGIN", format!("`{raw}`: {e}")))?,
            None => defaults.cors_origin,
        };

        Ok(Self {
            environment,
            host: get("HOST").unwrap_or(defaults.host),
            port,
            database_url: get("DATABASE_URL"),
            log_level,
            cors_origin,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
