use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use sqlx::postgres::PgSslMode;

use crate::error::{Error, Result};

#[derive(Clone, Debug)]
pub struct Config {
    pub db_host: String,
    pub db_port: u16,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,
    pub db_ssl_mode: PgSslMode,
    pub db_max_connections: u32,
    /// Restricts every watch to this namespace when set.
    pub watch_namespace: Option<String>,
    pub debug_mode: bool,
    pub health_probe_bind_address: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_owned());

        Ok(Self {
            db_host: var("DB_HOST", "localhost"),
            db_port: parse("DB_PORT", &var("DB_PORT", "5432"))?,
            db_name: var("DB_NAME", "edp-db"),
            db_user: var("DB_USER", "postgres"),
            db_password: var("DB_PASS", ""),
            db_ssl_mode: parse("DB_SSL_MODE", &var("DB_SSL_MODE", "disable"))?,
            db_max_connections: parse("DB_MAX_CONNECTIONS", &var("DB_MAX_CONNECTIONS", "5"))?,
            watch_namespace: lookup("WATCH_NAMESPACE").filter(|ns| !ns.is_empty()),
            debug_mode: parse("DEBUG_MODE", &var("DEBUG_MODE", "false"))?,
            health_probe_bind_address: parse(
                "HEALTH_PROBE_BIND_ADDRESS",
                &var("HEALTH_PROBE_BIND_ADDRESS", "0.0.0.0:8081"),
            )?,
        })
    }
}

fn parse<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|err| Error::Config(format!("{name}={value:?}: {err}")))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.db_host, "localhost");
        assert_eq!(config.db_port, 5432);
        assert_eq!(config.db_max_connections, 5);
        assert!(matches!(config.db_ssl_mode, PgSslMode::Disable));
        assert_eq!(config.watch_namespace, None);
        assert!(!config.debug_mode);
        assert_eq!(config.health_probe_bind_address.port(), 8081);
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("DB_HOST", "edp-db.edp"),
            ("DB_PORT", "6432"),
            ("DB_SSL_MODE", "require"),
            ("WATCH_NAMESPACE", "edp"),
            ("DEBUG_MODE", "true"),
        ])
        .unwrap();
        assert_eq!(config.db_host, "edp-db.edp");
        assert_eq!(config.db_port, 6432);
        assert!(matches!(config.db_ssl_mode, PgSslMode::Require));
        assert_eq!(config.watch_namespace.as_deref(), Some("edp"));
        assert!(config.debug_mode);
    }

    #[test]
    fn empty_namespace_watches_everything() {
        let config = config(&[("WATCH_NAMESPACE", "")]).unwrap();
        assert_eq!(config.watch_namespace, None);
    }

    #[test]
    fn invalid_port() {
        let err = config(&[("DB_PORT", "postgres")]).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.starts_with("DB_PORT")));
    }
}
