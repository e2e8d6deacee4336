use sqlx::PgConnection;

use crate::db::Schema;
use crate::error::Result;

const SELECT_SLAVE: &str = "select id from {schema}.jenkins_slave where name = $1;";
const INSERT_SLAVE: &str = "insert into {schema}.jenkins_slave(name) values ($1) \
    on conflict (name) do nothing;";
const SELECT_JOB_PROVISIONING: &str =
    "select id from {schema}.job_provisioning where name = $1 and scope = $2;";
const INSERT_JOB_PROVISIONING: &str = "insert into {schema}.job_provisioning(name, scope) values ($1, $2) \
    on conflict (name, scope) do nothing;";

pub const CI_SCOPE: &str = "ci";
pub const CD_SCOPE: &str = "cd";

pub async fn select_slave_id(
    conn: &mut PgConnection,
    schema: &Schema,
    name: &str,
) -> Result<Option<i32>> {
    super::select_id(conn, schema, SELECT_SLAVE, name).await
}

/// Inserts the slave unless it is registered already. Returns whether a row
/// was added.
pub async fn insert_slave(conn: &mut PgConnection, schema: &Schema, name: &str) -> Result<bool> {
    let sql = schema.render(INSERT_SLAVE);
    let inserted = sqlx::query(&sql)
        .bind(name)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    Ok(inserted > 0)
}

pub async fn select_job_provisioning_id(
    conn: &mut PgConnection,
    schema: &Schema,
    name: &str,
    scope: &str,
) -> Result<Option<i32>> {
    let sql = schema.render(SELECT_JOB_PROVISIONING);
    let id = sqlx::query_scalar::<_, i32>(&sql)
        .bind(name)
        .bind(scope)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(id)
}

pub async fn insert_job_provisioning(
    conn: &mut PgConnection,
    schema: &Schema,
    name: &str,
    scope: &str,
) -> Result<bool> {
    let sql = schema.render(INSERT_JOB_PROVISIONING);
    let inserted = sqlx::query(&sql)
        .bind(name)
        .bind(scope)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    Ok(inserted > 0)
}
