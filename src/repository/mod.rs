//! SQL statements against a tenant schema.
//!
//! Every function takes the connection (usually a transaction) and the tenant
//! [`Schema`]; statements are `{schema}` templates rendered per call. Lookups
//! return `None` when the row does not exist.

use sqlx::PgConnection;

use crate::db::Schema;
use crate::error::Result;
use crate::model::ActionLog;

pub mod cd_pipeline;
pub mod codebase;
pub mod codebase_branch;
pub mod docker_stream;
pub mod edp_component;
pub mod git_server;
pub mod jenkins;
pub mod perf_data_source;
pub mod server;
pub mod stage;
pub mod third_party_service;

const INSERT_ACTION_LOG: &str = "insert into {schema}.action_log(event, detailed_message, username, updated_at, action, result, action_message) \
    values ($1, $2, $3, $4, $5, $6, $7) returning id;";

/// Appends `log` to the tenant's action log and returns the new row id.
pub async fn insert_action_log(
    conn: &mut PgConnection,
    schema: &Schema,
    log: &ActionLog,
) -> Result<i32> {
    let sql = schema.render(INSERT_ACTION_LOG);
    let id = sqlx::query_scalar::<_, i32>(&sql)
        .bind(&log.event)
        .bind(&log.detailed_message)
        .bind(&log.username)
        .bind(log.updated_at)
        .bind(&log.action)
        .bind(&log.result)
        .bind(&log.action_message)
        .fetch_one(&mut *conn)
        .await?;
    Ok(id)
}

/// Runs a lookup that yields at most one id.
async fn select_id(
    conn: &mut PgConnection,
    schema: &Schema,
    template: &str,
    name: &str,
) -> Result<Option<i32>> {
    let sql = schema.render(template);
    let id = sqlx::query_scalar::<_, i32>(&sql)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(id)
}

/// Inserts an `(owner_id, target_id)` row into a two-column link table.
async fn link(
    conn: &mut PgConnection,
    schema: &Schema,
    template: &str,
    owner_id: i32,
    target_id: i32,
) -> Result<()> {
    let sql = schema.render(template);
    sqlx::query(&sql)
        .bind(owner_id)
        .bind(target_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
