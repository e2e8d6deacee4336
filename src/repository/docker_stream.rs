//! `codebase_docker_stream`: image streams built from branches or promoted by
//! CD stages.

use sqlx::PgConnection;

use crate::db::Schema;
use crate::error::Result;

const SELECT_STREAM: &str =
    "select id from {schema}.codebase_docker_stream where oc_image_stream_name = $1;";
const INSERT_STREAM: &str = "insert into {schema}.codebase_docker_stream(codebase_id, oc_image_stream_name, codebase_branch_id) \
    values ($1, $2, $3) returning id;";
const SELECT_STREAM_CODEBASE: &str = "select c.id, c.name from {schema}.codebase_docker_stream cds \
    join {schema}.codebase c on c.id = cds.codebase_id where cds.id = $1;";
const DELETE_BRANCH_STREAMS: &str =
    "delete from {schema}.codebase_docker_stream where codebase_branch_id = $1;";
/// Streams still consumed as a pipeline input or linked to a stage are kept.
const DELETE_UNUSED_STREAMS: &str = "delete from {schema}.codebase_docker_stream cds \
    where cds.id = any($1) \
    and not exists (select 1 from {schema}.cd_pipeline_docker_stream cpds \
        where cpds.codebase_docker_stream_id = cds.id) \
    and not exists (select 1 from {schema}.stage_codebase_docker_stream scds \
        where scds.input_codebase_docker_stream_id = cds.id \
        or scds.output_codebase_docker_stream_id = cds.id);";

pub async fn select_id(
    conn: &mut PgConnection,
    schema: &Schema,
    name: &str,
) -> Result<Option<i32>> {
    super::select_id(conn, schema, SELECT_STREAM, name).await
}

pub async fn insert(
    conn: &mut PgConnection,
    schema: &Schema,
    codebase_id: i32,
    name: &str,
    branch_id: Option<i32>,
) -> Result<i32> {
    let sql = schema.render(INSERT_STREAM);
    let id = sqlx::query_scalar::<_, i32>(&sql)
        .bind(codebase_id)
        .bind(name)
        .bind(branch_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(id)
}

/// Returns the id of the stream `name`, inserting it for `codebase_id` when it
/// does not exist yet.
pub async fn get_or_insert(
    conn: &mut PgConnection,
    schema: &Schema,
    codebase_id: i32,
    name: &str,
) -> Result<i32> {
    match select_id(conn, schema, name).await? {
        Some(id) => Ok(id),
        None => insert(conn, schema, codebase_id, name, None).await,
    }
}

/// Id and name of the codebase the stream belongs to.
pub async fn select_codebase(
    conn: &mut PgConnection,
    schema: &Schema,
    stream_id: i32,
) -> Result<Option<(i32, String)>> {
    let sql = schema.render(SELECT_STREAM_CODEBASE);
    let codebase = sqlx::query_as::<_, (i32, String)>(&sql)
        .bind(stream_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(codebase)
}

pub async fn delete_for_branch(
    conn: &mut PgConnection,
    schema: &Schema,
    branch_id: i32,
) -> Result<()> {
    let sql = schema.render(DELETE_BRANCH_STREAMS);
    sqlx::query(&sql)
        .bind(branch_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Deletes the streams in `ids` that nothing refers to any more.
pub async fn delete_unused(conn: &mut PgConnection, schema: &Schema, ids: &[i32]) -> Result<u64> {
    if ids.is_empty() {
        return Ok(0);
    }
    let sql = schema.render(DELETE_UNUSED_STREAMS);
    let deleted = sqlx::query(&sql)
        .bind(ids)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    Ok(deleted)
}
