use sqlx::PgConnection;

use crate::db::Schema;
use crate::error::Result;

const INSERT_DATA_SOURCE: &str = "insert into {schema}.perf_data_source(type) values ($1) \
    on conflict (type) do update set type = excluded.type returning id;";
const INSERT_CODEBASE_DATA_SOURCE: &str = "insert into {schema}.codebase_perf_data_source(codebase_id, data_source_id) \
    values ($1, $2) on conflict do nothing;";
const DELETE_CODEBASE_DATA_SOURCES: &str =
    "delete from {schema}.codebase_perf_data_source where codebase_id = $1;";
const DELETE_CODEBASE_DATA_SOURCE: &str = "delete from {schema}.codebase_perf_data_source cpds \
    using {schema}.perf_data_source pds \
    where cpds.data_source_id = pds.id and cpds.codebase_id = $1 and pds.type = $2;";

/// Returns the id of the data source `type_`, registering it if needed.
pub async fn get_or_insert(conn: &mut PgConnection, schema: &Schema, type_: &str) -> Result<i32> {
    let sql = schema.render(INSERT_DATA_SOURCE);
    let id = sqlx::query_scalar::<_, i32>(&sql)
        .bind(type_)
        .fetch_one(&mut *conn)
        .await?;
    Ok(id)
}

pub async fn link_codebase(
    conn: &mut PgConnection,
    schema: &Schema,
    codebase_id: i32,
    data_source_id: i32,
) -> Result<()> {
    super::link(conn, schema, INSERT_CODEBASE_DATA_SOURCE, codebase_id, data_source_id).await
}

pub async fn unlink_codebase(
    conn: &mut PgConnection,
    schema: &Schema,
    codebase_id: i32,
) -> Result<()> {
    let sql = schema.render(DELETE_CODEBASE_DATA_SOURCES);
    sqlx::query(&sql)
        .bind(codebase_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Removes the link between the codebase and the data source of `type_`.
pub async fn unlink_codebase_type(
    conn: &mut PgConnection,
    schema: &Schema,
    codebase_id: i32,
    type_: &str,
) -> Result<u64> {
    let sql = schema.render(DELETE_CODEBASE_DATA_SOURCE);
    let deleted = sqlx::query(&sql)
        .bind(codebase_id)
        .bind(type_)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    Ok(deleted)
}
