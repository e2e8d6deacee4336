use sqlx::PgConnection;

use crate::db::Schema;
use crate::error::Result;
use crate::model::codebase_branch::CodebaseBranch;

const SELECT_BRANCH: &str =
    "select id from {schema}.codebase_branch where name = $1 and codebase_id = $2;";
const INSERT_BRANCH: &str = "insert into {schema}.codebase_branch(name, codebase_id, from_commit, status, version, \
    build_number, last_success_build, release) values ($1, $2, $3, $4, $5, $6, $7, $8) returning id;";
const UPDATE_BRANCH: &str = "update {schema}.codebase_branch set status = $1, version = $2, build_number = $3, \
    last_success_build = $4, release = $5 where id = $6;";
const SET_OUTPUT_STREAM: &str =
    "update {schema}.codebase_branch set output_codebase_docker_stream_id = $1 where id = $2;";
const DELETE_BRANCH: &str = "delete from {schema}.codebase_branch where id = $1;";
const INSERT_BRANCH_ACTION_LOG: &str = "insert into {schema}.codebase_branch_action_log(codebase_branch_id, action_log_id) \
    values ($1, $2);";

pub async fn select_id(
    conn: &mut PgConnection,
    schema: &Schema,
    name: &str,
    codebase_id: i32,
) -> Result<Option<i32>> {
    let sql = schema.render(SELECT_BRANCH);
    let id = sqlx::query_scalar::<_, i32>(&sql)
        .bind(name)
        .bind(codebase_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(id)
}

pub async fn insert(
    conn: &mut PgConnection,
    schema: &Schema,
    branch: &CodebaseBranch,
    codebase_id: i32,
) -> Result<i32> {
    let sql = schema.render(INSERT_BRANCH);
    let id = sqlx::query_scalar::<_, i32>(&sql)
        .bind(&branch.name)
        .bind(codebase_id)
        .bind(&branch.from_commit)
        .bind(&branch.status)
        .bind(branch.version.as_deref())
        .bind(branch.build_number.as_deref())
        .bind(branch.last_success_build.as_deref())
        .bind(branch.release)
        .fetch_one(&mut *conn)
        .await?;
    Ok(id)
}

pub async fn update(
    conn: &mut PgConnection,
    schema: &Schema,
    id: i32,
    branch: &CodebaseBranch,
) -> Result<()> {
    let sql = schema.render(UPDATE_BRANCH);
    sqlx::query(&sql)
        .bind(&branch.status)
        .bind(branch.version.as_deref())
        .bind(branch.build_number.as_deref())
        .bind(branch.last_success_build.as_deref())
        .bind(branch.release)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn set_output_stream(
    conn: &mut PgConnection,
    schema: &Schema,
    id: i32,
    stream_id: i32,
) -> Result<()> {
    let sql = schema.render(SET_OUTPUT_STREAM);
    sqlx::query(&sql)
        .bind(stream_id)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn delete(conn: &mut PgConnection, schema: &Schema, id: i32) -> Result<()> {
    let sql = schema.render(DELETE_BRANCH);
    sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
    Ok(())
}

pub async fn insert_action_log(
    conn: &mut PgConnection,
    schema: &Schema,
    branch_id: i32,
    action_log_id: i32,
) -> Result<()> {
    super::link(conn, schema, INSERT_BRANCH_ACTION_LOG, branch_id, action_log_id).await
}
