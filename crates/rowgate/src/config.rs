//! Connection configuration.

use std::fmt;
use std::time::Duration;

use crate::error::{RowgateError, RowgateResult};

/// Environment variable names read by [`ConnectionConfig::from_env`].
pub mod env {
    pub const HOST: &str = "DATABASE_HOST";
    pub const USER: &str = "DATABASE_USER";
    pub const PASSWORD: &str = "DATABASE_PASSWORD";
    pub const NAME: &str = "DATABASE_NAME";
    pub const PORT: &str = "DATABASE_PORT";
    pub const AUTO_COMMIT: &str = "DATABASE_AUTO_COMMIT";
    pub const AUTO_RECONNECT: &str = "DATABASE_AUTO_RECONNECT";
    pub const CONNECT_TIMEOUT_MS: &str = "DATABASE_CONNECT_TIMEOUT_MS";
    pub const STATEMENT_TIMEOUT_MS: &str = "DATABASE_STATEMENT_TIMEOUT_MS";
    pub const APPLICATION_NAME: &str = "DATABASE_APPLICATION_NAME";
}

/// Configuration for a [`Database`](crate::Database) connection.
///
/// `password` is never printed by `Debug`.
#[derive(Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub port: u16,
    /// Commit each statement on its own. When off, the first statement opens
    /// a transaction that lasts until `commit()`/`rollback()`.
    pub auto_commit: bool,
    /// Reconnect once when the connection is found dropped, and enable TCP
    /// keepalives.
    pub auto_reconnect: bool,
    pub connect_timeout: Option<Duration>,
    /// Client-side limit on each statement.
    pub statement_timeout: Option<Duration>,
    /// Reported to the server as `application_name`.
    pub application_name: String,
}

impl ConnectionConfig {
    pub const DEFAULT_PORT: u16 = 5432;
    pub const DEFAULT_APPLICATION_NAME: &'static str = "rowgate";

    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        dbname: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            password: password.into(),
            dbname: dbname.into(),
            port: Self::DEFAULT_PORT,
            auto_commit: true,
            auto_reconnect: true,
            connect_timeout: None,
            statement_timeout: None,
            application_name: Self::DEFAULT_APPLICATION_NAME.to_string(),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn auto_commit(mut self, enabled: bool) -> Self {
        self.auto_commit = enabled;
        self
    }

    pub fn auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }

    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = name.into();
        self
    }

    /// Check every field. Called by `Database::connect` before any I/O.
    pub fn validate(&self) -> RowgateResult<()> {
        if self.host.trim().is_empty() {
            return Err(RowgateError::config_type("host", "must be non-empty text"));
        }
        // Presence only: spaces are valid in these.
        for (field, value) in [
            ("user", &self.user),
            ("password", &self.password),
            ("dbname", &self.dbname),
        ] {
            if value.is_empty() {
                return Err(RowgateError::config_type(field, "must be non-empty text"));
            }
        }
        if self.statement_timeout == Some(Duration::ZERO) {
            return Err(RowgateError::config_type(
                "statement_timeout",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Load from the process environment, reading a `.env` file first if one
    /// exists.
    pub fn from_env() -> RowgateResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    ///
    /// Text values are parsed strictly: a port outside `0..=65535` or a flag
    /// that is not a boolean fails with [`RowgateError::ConfigType`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> RowgateResult<Self> {
        let required = |field: &'static str, key: &str| {
            lookup(key).ok_or_else(|| RowgateError::config_type(field, format!("{key} is not set")))
        };

        let mut config = Self::new(
            required("host", env::HOST)?,
            required("user", env::USER)?,
            required("password", env::PASSWORD)?,
            required("dbname", env::NAME)?,
        );

        if let Some(raw) = lookup(env::PORT) {
            config.port = parse_port(&raw)?;
        }
        if let Some(raw) = lookup(env::AUTO_COMMIT) {
            config.auto_commit = parse_flag("auto_commit", &raw)?;
        }
        if let Some(raw) = lookup(env::AUTO_RECONNECT) {
            config.auto_reconnect = parse_flag("auto_reconnect", &raw)?;
        }
        if let Some(raw) = lookup(env::CONNECT_TIMEOUT_MS) {
            config.connect_timeout = Some(parse_millis("connect_timeout", &raw)?);
        }
        if let Some(raw) = lookup(env::STATEMENT_TIMEOUT_MS) {
            config.statement_timeout = Some(parse_millis("statement_timeout", &raw)?);
        }
        if let Some(name) = lookup(env::APPLICATION_NAME) {
            config.application_name = name;
        }

        config.validate()?;
        Ok(config)
    }

    /// Driver configuration for this connection.
    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut pg = tokio_postgres::Config::new();
        pg.host(&self.host)
            .port(self.port)
            .user(&self.user)
            .password(&self.password)
            .dbname(&self.dbname)
            .application_name(&self.application_name)
            .keepalives(self.auto_reconnect);
        if let Some(timeout) = self.connect_timeout {
            pg.connect_timeout(timeout);
        }
        pg
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("dbname", &self.dbname)
            .field("port", &self.port)
            .field("auto_commit", &self.auto_commit)
            .field("auto_reconnect", &self.auto_reconnect)
            .field("connect_timeout", &self.connect_timeout)
            .field("statement_timeout", &self.statement_timeout)
            .field("application_name", &self.application_name)
            .finish()
    }
}

fn parse_port(raw: &str) -> RowgateResult<u16> {
    let port: i64 = raw
        .trim()
        .parse()
        .map_err(|_| RowgateError::config_type("port", format!("{raw:?} is not an integer")))?;
    u16::try_from(port).map_err(|_| {
        RowgateError::config_type("port", format!("{port} is outside 0..=65535"))
    })
}

fn parse_flag(field: &'static str, raw: &str) -> RowgateResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(RowgateError::config_type(
            field,
            format!("{raw:?} is not a boolean"),
        )),
    }
}

fn parse_millis(field: &'static str, raw: &str) -> RowgateResult<Duration> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| RowgateError::config_type(field, format!("{raw:?} is not a millisecond count")))
}
