use sqlx::{FromRow, PgConnection};

use crate::db::Schema;
use crate::error::Result;

const SELECT_PIPELINE: &str =
    "select id, name, deployment_type, status from {schema}.cd_pipeline where name = $1;";
const INSERT_PIPELINE: &str = "insert into {schema}.cd_pipeline(name, deployment_type, status) values ($1, $2, $3) \
    returning id, name, deployment_type, status;";
const UPDATE_STATUS: &str = "update {schema}.cd_pipeline set status = $1 where id = $2;";
const DELETE_PIPELINE: &str = "delete from {schema}.cd_pipeline where name = $1;";
const INSERT_DOCKER_STREAM: &str = "insert into {schema}.cd_pipeline_docker_stream(cd_pipeline_id, codebase_docker_stream_id) \
    values ($1, $2);";
const DELETE_DOCKER_STREAMS: &str =
    "delete from {schema}.cd_pipeline_docker_stream where cd_pipeline_id = $1;";
const SELECT_DOCKER_STREAMS: &str =
    "select codebase_docker_stream_id from {schema}.cd_pipeline_docker_stream where cd_pipeline_id = $1;";
const INSERT_APPLICATION: &str =
    "insert into {schema}.applications_to_promote(cd_pipeline_id, codebase_id) values ($1, $2);";
const SELECT_APPLICATIONS: &str = "select c.name from {schema}.applications_to_promote atp \
    join {schema}.codebase c on c.id = atp.codebase_id where atp.cd_pipeline_id = $1;";
const DELETE_APPLICATIONS: &str =
    "delete from {schema}.applications_to_promote where cd_pipeline_id = $1;";
const INSERT_ACTION: &str =
    "insert into {schema}.cd_pipeline_action(cd_pipeline_id, action_log_id) values ($1, $2);";

/// A row of `cd_pipeline`.
#[derive(Clone, Debug, PartialEq, FromRow)]
pub struct CDPipelineRow {
    pub id: i32,
    pub name: String,
    pub deployment_type: Option<String>,
    pub status: Option<String>,
}

pub async fn select(
    conn: &mut PgConnection,
    schema: &Schema,
    name: &str,
) -> Result<Option<CDPipelineRow>> {
    let sql = schema.render(SELECT_PIPELINE);
    let row = sqlx::query_as::<_, CDPipelineRow>(&sql)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn insert(
    conn: &mut PgConnection,
    schema: &Schema,
    name: &str,
    deployment_type: &str,
    status: &str,
) -> Result<CDPipelineRow> {
    let sql = schema.render(INSERT_PIPELINE);
    let row = sqlx::query_as::<_, CDPipelineRow>(&sql)
        .bind(name)
        .bind(deployment_type)
        .bind(status)
        .fetch_one(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn update_status(
    conn: &mut PgConnection,
    schema: &Schema,
    id: i32,
    status: &str,
) -> Result<()> {
    let sql = schema.render(UPDATE_STATUS);
    sqlx::query(&sql)
        .bind(status)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn delete(conn: &mut PgConnection, schema: &Schema, name: &str) -> Result<u64> {
    let sql = schema.render(DELETE_PIPELINE);
    let deleted = sqlx::query(&sql)
        .bind(name)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    Ok(deleted)
}

pub async fn insert_docker_stream(
    conn: &mut PgConnection,
    schema: &Schema,
    pipeline_id: i32,
    stream_id: i32,
) -> Result<()> {
    super::link(conn, schema, INSERT_DOCKER_STREAM, pipeline_id, stream_id).await
}

pub async fn delete_docker_streams(
    conn: &mut PgConnection,
    schema: &Schema,
    pipeline_id: i32,
) -> Result<()> {
    let sql = schema.render(DELETE_DOCKER_STREAMS);
    sqlx::query(&sql)
        .bind(pipeline_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Ids of the input streams of the pipeline, in insertion order.
pub async fn select_docker_streams(
    conn: &mut PgConnection,
    schema: &Schema,
    pipeline_id: i32,
) -> Result<Vec<i32>> {
    let sql = schema.render(SELECT_DOCKER_STREAMS);
    let ids = sqlx::query_scalar::<_, i32>(&sql)
        .bind(pipeline_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(ids)
}

pub async fn insert_application(
    conn: &mut PgConnection,
    schema: &Schema,
    pipeline_id: i32,
    codebase_id: i32,
) -> Result<()> {
    super::link(conn, schema, INSERT_APPLICATION, pipeline_id, codebase_id).await
}

/// Names of the applications the pipeline promotes.
pub async fn select_applications(
    conn: &mut PgConnection,
    schema: &Schema,
    pipeline_id: i32,
) -> Result<Vec<String>> {
    let sql = schema.render(SELECT_APPLICATIONS);
    let names = sqlx::query_scalar::<_, String>(&sql)
        .bind(pipeline_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(names)
}

pub async fn delete_applications(
    conn: &mut PgConnection,
    schema: &Schema,
    pipeline_id: i32,
) -> Result<()> {
    let sql = schema.render(DELETE_APPLICATIONS);
    sqlx::query(&sql)
        .bind(pipeline_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn insert_action(
    conn: &mut PgConnection,
    schema: &Schema,
    pipeline_id: i32,
    action_log_id: i32,
) -> Result<()> {
    super::link(conn, schema, INSERT_ACTION, pipeline_id, action_log_id).await
}
