//! Database connection settings.
//!
//! Connection parameters are gathered once into a [`DbConfig`] and passed
//! explicitly to the storage layer. Nothing in the loader reads the
//! environment on its own.

use std::fmt;
use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::config::constants::DEFAULT_DB_PORT;
use crate::error_handling::ConfigError;

/// PostgreSQL connection parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
    /// libpq-style mode: disable, allow, prefer, require, verify-ca, verify-full
    pub ssl_mode: String,
    /// Full `postgres://` URL; when set it replaces every other field
    pub url: Option<String>,
}

impl DbConfig {
    /// Builds the configuration from process environment variables.
    ///
    /// Reads `DB_HOST`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`, `CONTAINER_PORT`
    /// (falling back to `DB_PORT`) and `DB_SSL_MODE`. `DATABASE_URL` wins over
    /// all of them when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("DATABASE_URL") {
            PgConnectOptions::from_str(&url).map_err(ConfigError::InvalidUrl)?;
            return Ok(Self {
                url: Some(url),
                ..Self::default()
            });
        }

        let port = match get("CONTAINER_PORT").or_else(|| get("DB_PORT")) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidVar {
                name: "DB_PORT",
                value: raw,
            })?,
            None => DEFAULT_DB_PORT,
        };

        let ssl_mode = get("DB_SSL_MODE").unwrap_or_else(|| "prefer".to_string());
        PgSslMode::from_str(&ssl_mode).map_err(|_| ConfigError::InvalidVar {
            name: "DB_SSL_MODE",
            value: ssl_mode.clone(),
        })?;

        Ok(Self {
            host: get("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
            user: get("DB_USER").ok_or(ConfigError::MissingVar("DB_USER"))?,
            password: get("DB_PASSWORD").unwrap_or_default(),
            database: get("DB_NAME").ok_or(ConfigError::MissingVar("DB_NAME"))?,
            port,
            ssl_mode,
            url: None,
        })
    }

    /// Converts the settings into sqlx connect options.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url).map_err(ConfigError::InvalidUrl);
        }

        let ssl_mode =
            PgSslMode::from_str(&self.ssl_mode).map_err(|_| ConfigError::InvalidVar {
                name: "DB_SSL_MODE",
                value: self.ssl_mode.clone(),
            })?;

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(ssl_mode))
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            user: String::new(),
            password: String::new(),
            database: String::new(),
            port: DEFAULT_DB_PORT,
            ssl_mode: "prefer".to_string(),
            url: None,
        }
    }
}

// Never print the password.
impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("port", &self.port)
            .field("ssl_mode", &self.ssl_mode)
            .field("url", &self.url.as_ref().map(|_| "***"))
            .finish()
    }
}

impl fmt::Display for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.url.is_some() {
            return f.write_str("DATABASE_URL");
        }
        write!(
            f,
            "host={} user={} dbname={} port={} sslmode={}",
            self.host, self.user, self.database, self.port, self.ssl_mode
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_reads_all_fields() {
        let config = DbConfig::from_lookup(lookup(&[
            ("DB_HOST", "db.internal"),
            ("DB_USER", "loader"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "school"),
            ("DB_PORT", "5433"),
            ("DB_SSL_MODE", "disable"),
        ]))
        .expect("config should load");

        assert_eq!(config.host, "db.internal");
        assert_eq!(config.user, "loader");
        assert_eq!(config.database, "school");
        assert_eq!(config.port, 5433);
        assert_eq!(config.ssl_mode, "disable");
        assert!(config.connect_options().is_ok());
    }

    #[test]
    fn test_container_port_wins_over_db_port() {
        let config = DbConfig::from_lookup(lookup(&[
            ("DB_USER", "loader"),
            ("DB_NAME", "school"),
            ("DB_PORT", "5432"),
            ("CONTAINER_PORT", "15432"),
        ]))
        .expect("config should load");
        assert_eq!(config.port, 15432);
    }

    #[test]
    fn test_missing_user_is_an_error() {
        let result = DbConfig::from_lookup(lookup(&[("DB_NAME", "school")]));
        assert!(matches!(result, Err(ConfigError::MissingVar("DB_USER"))));
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let result = DbConfig::from_lookup(lookup(&[
            ("DB_USER", "loader"),
            ("DB_NAME", "school"),
            ("DB_PORT", "not-a-port"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidVar { .. })));
    }

    #[test]
    fn test_invalid_ssl_mode_is_an_error() {
        let result = DbConfig::from_lookup(lookup(&[
            ("DB_USER", "loader"),
            ("DB_NAME", "school"),
            ("DB_SSL_MODE", "sometimes"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidVar {
                name: "DB_SSL_MODE",
                ..
            })
        ));
    }

    #[test]
    fn test_database_url_overrides_fields() {
        let config = DbConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://u:p@localhost:5432/db"),
            ("DB_HOST", "ignored"),
        ]))
        .expect("config should load");
        assert!(config.url.is_some());
        assert_eq!(config.to_string(), "DATABASE_URL");
    }

    #[test]
    fn test_debug_hides_password() {
        let config = DbConfig {
            password: "hunter2".to_string(),
            ..DbConfig::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
    }
}
