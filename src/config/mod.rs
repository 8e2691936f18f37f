//! Connection configuration.
//!
//! The builder itself is a pure value and needs no configuration at all;
//! [`ConnectOptions`] exists only as the seam a concrete [`crate::driver::Driver`]
//! adapter and its tests plug into (host/port/dbname/user, plus which
//! [`Dialect`] to render for). Connection pooling, TLS and authentication are
//! the adapter's own concern (§1 of the design) - this struct carries the
//! handful of fields every adapter needs regardless of transport.

use crate::sql::dialect::Dialect;
use std::env;

/// Error produced while assembling a [`ConnectOptions`] from the
/// environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("unrecognized dialect: {0} (expected \"postgres\" or \"mysql\")")]
    UnknownDialect(String),

    #[error("invalid port: {0}")]
    InvalidPort(String),
}

/// The connection parameters a caller's [`crate::driver::Driver`] adapter
/// needs to open a connection, plus the [`Dialect`] statements should be
/// rendered for. This crate never opens a connection itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub dialect: Dialect,
    pub host: String,
    pub port: Option<u16>,
    pub database: String,
    pub user: String,
    pub password: Option<String>,
}

impl ConnectOptions {
    pub fn new(dialect: Dialect, host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            dialect,
            host: host.into(),
            port: None,
            database: database.into(),
            user: String::new(),
            password: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Default port for the configured dialect, if none was set explicitly.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(match self.dialect {
            Dialect::Postgres => 5432,
            Dialect::MySql => 3306,
        })
    }

    /// Reads `SQLCRAFT_DIALECT`, `SQLCRAFT_HOST`, `SQLCRAFT_DATABASE`,
    /// `SQLCRAFT_USER`, and optionally `SQLCRAFT_PORT`/`SQLCRAFT_PASSWORD`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let dialect = match env::var("SQLCRAFT_DIALECT")
            .map_err(|_| ConfigError::MissingEnvVar("SQLCRAFT_DIALECT".into()))?
            .to_lowercase()
            .as_str()
        {
            "postgres" | "postgresql" => Dialect::Postgres,
            "mysql" => Dialect::MySql,
            other => return Err(ConfigError::UnknownDialect(other.to_string())),
        };
        let host = env::var("SQLCRAFT_HOST")
            .map_err(|_| ConfigError::MissingEnvVar("SQLCRAFT_HOST".into()))?;
        let database = env::var("SQLCRAFT_DATABASE")
            .map_err(|_| ConfigError::MissingEnvVar("SQLCRAFT_DATABASE".into()))?;
        let user = env::var("SQLCRAFT_USER")
            .map_err(|_| ConfigError::MissingEnvVar("SQLCRAFT_USER".into()))?;
        let port = match env::var("SQLCRAFT_PORT") {
            Ok(raw) => Some(
                raw.parse::<u16>()
                    .map_err(|_| ConfigError::InvalidPort(raw))?,
            ),
            Err(_) => None,
        };
        let password = env::var("SQLCRAFT_PASSWORD").ok();

        Ok(Self {
            dialect,
            host,
            port,
            database,
            user,
            password,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_port_falls_back_to_dialect_default() {
        let opts = ConnectOptions::new(Dialect::Postgres, "localhost", "chinook");
        assert_eq!(opts.effective_port(), 5432);

        let opts = ConnectOptions::new(Dialect::MySql, "localhost", "chinook");
        assert_eq!(opts.effective_port(), 3306);
    }

    #[test]
    fn explicit_port_overrides_the_dialect_default() {
        let opts = ConnectOptions::new(Dialect::Postgres, "localhost", "chinook").with_port(5433);
        assert_eq!(opts.effective_port(), 5433);
    }

    #[test]
    fn builder_methods_set_user_and_password() {
        let opts = ConnectOptions::new(Dialect::Postgres, "localhost", "chinook")
            .with_user("app")
            .with_password("hunter2");
        assert_eq!(opts.user, "app");
        assert_eq!(opts.password.as_deref(), Some("hunter2"));
    }
}
