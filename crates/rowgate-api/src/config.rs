//! Server configuration.

use std::net::SocketAddr;

use rowgate::{ConnectionConfig, RowgateError, RowgateResult};

/// Environment variable holding the listen address.
pub const LISTEN_ENV: &str = "ROWGATE_LISTEN";

pub const DEFAULT_LISTEN: &str = "127.0.0.1:5000";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub listen: SocketAddr,
    pub database: ConnectionConfig,
}

impl ApiConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> RowgateResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> RowgateResult<Self> {
        let raw = lookup(LISTEN_ENV).unwrap_or_else(|| DEFAULT_LISTEN.to_string());
        let listen = raw.trim().parse().map_err(|_| {
            RowgateError::config_type("listen", format!("{raw:?} is not a socket address"))
        })?;
        Ok(Self {
            listen,
            database: ConnectionConfig::from_lookup(lookup)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowgate::config::env;

    fn lookup(listen: Option<&'static str>) -> impl Fn(&str) -> Option<String> {
        move |key: &str| {
            let value = match key {
                LISTEN_ENV => listen?,
                env::HOST => "127.0.0.1",
                env::USER => "root",
                env::PASSWORD => "root",
                env::NAME => "crocosoft",
                _ => return None,
            };
            Some(value.to_string())
        }
    }

    #[test]
    fn listen_defaults_to_localhost_5000() {
        let config = ApiConfig::from_lookup(lookup(None)).unwrap();
        assert_eq!(config.listen, "127.0.0.1:5000".parse().unwrap());
        assert_eq!(config.database.dbname, "crocosoft");
    }

    #[test]
    fn bad_listen_address_is_a_config_error() {
        let err = ApiConfig::from_lookup(lookup(Some("localhost"))).unwrap_err();
        assert_eq!(err.config_field(), Some("listen"));
    }
}
