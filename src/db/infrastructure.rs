use sqlx::{Executor, PgPool};
use tracing::{event, Level};

use super::Schema;
use crate::error::Result;

const SELECT_SCHEMA: &str =
    "select exists(select 1 from information_schema.schemata where schema_name = $1);";

/// DDL of a tenant schema, as a `{schema}` template.
pub const TENANT_SCHEMA: &str = include_str!("../../sql/tenant_schema.sql");

pub async fn schema_exists(pool: &PgPool, schema: &Schema) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>(SELECT_SCHEMA)
        .bind(schema.name())
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

/// Creates the tenant schema and its tables if they are missing.
pub async fn create_schema(pool: &PgPool, schema: &Schema) -> Result<()> {
    let mut tx = pool.begin().await?;
    (&mut *tx).execute(schema.render(TENANT_SCHEMA).as_str()).await?;
    tx.commit().await?;
    event!(Level::INFO, schema = %schema, "Tenant schema is in place.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_schema_is_fully_qualified() {
        let rendered = Schema::new("foobar").unwrap().render(TENANT_SCHEMA);
        assert!(!rendered.contains("{schema}"));
        assert!(rendered.starts_with(r#"create schema if not exists "foobar";"#));
        assert!(rendered.contains(r#"create table if not exists "foobar".cd_pipeline"#));
    }
}
