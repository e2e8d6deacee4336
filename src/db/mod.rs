//! Connection pool and tenant schema handling.
//!
//! Every tenant ("EDP name") owns a postgres schema with the same set of
//! tables. SQL statements are written as templates containing a `{schema}`
//! placeholder which [`Schema::render`] replaces with the quoted schema name.

use std::fmt;
use std::time::Duration;

use log::LevelFilter;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};

use crate::config::Config;
use crate::error::{Error, Result};

pub mod infrastructure;

const SCHEMA_PLACEHOLDER: &str = "{schema}";

pub async fn connect(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(10))
        .max_connections(config.db_max_connections)
        .connect_with(conn_options(config))
        .await?;
    Ok(pool)
}

pub fn conn_options(config: &Config) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.db_host)
        .port(config.db_port)
        .database(&config.db_name)
        .username(&config.db_user)
        .password(&config.db_password)
        .ssl_mode(config.db_ssl_mode)
        .log_statements(LevelFilter::Debug)
}

/// A tenant schema name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Schema(String);

impl Schema {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() || name.contains('\0') {
            return Err(Error::InvalidSchemaName(name));
        }
        Ok(Self(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// The schema as a quoted SQL identifier.
    pub fn ident(&self) -> String {
        format!("\"{}\"", self.0.replace('"', "\"\""))
    }

    pub fn render(&self, template: &str) -> String {
        template.replace(SCHEMA_PLACEHOLDER, &self.ident())
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_quotes_the_schema() {
        let schema = Schema::new("foobar").unwrap();
        assert_eq!(
            schema.render("select id from {schema}.codebase where name = $1;"),
            r#"select id from "foobar".codebase where name = $1;"#
        );
    }

    #[test]
    fn render_escapes_quotes() {
        let schema = Schema::new(r#"evil".codebase; drop table x; --"#).unwrap();
        assert_eq!(
            schema.ident(),
            r#""evil"".codebase; drop table x; --""#
        );
    }

    #[test]
    fn empty_names_are_rejected() {
        assert!(matches!(
            Schema::new("  "),
            Err(Error::InvalidSchemaName(_))
        ));
    }
}
