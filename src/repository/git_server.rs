use sqlx::PgConnection;

use crate::db::Schema;
use crate::error::Result;
use crate::model::git_server::GitServer;

const SELECT_GIT_SERVER: &str = "select id from {schema}.git_server where name = $1;";
const UPSERT_GIT_SERVER: &str = "insert into {schema}.git_server(name, hostname, username, ssh_port, https_port, private_ssh_key, \
    create_code_review_pipeline, available) values ($1, $2, $3, $4, $5, $6, $7, $8) \
    on conflict (name) do update set hostname = excluded.hostname, username = excluded.username, \
    ssh_port = excluded.ssh_port, https_port = excluded.https_port, private_ssh_key = excluded.private_ssh_key, \
    create_code_review_pipeline = excluded.create_code_review_pipeline, available = excluded.available \
    returning id;";
const INSERT_ACTION_LOG: &str =
    "insert into {schema}.git_server_action_log(git_server_id, action_log_id) values ($1, $2);";

pub async fn select_id(
    conn: &mut PgConnection,
    schema: &Schema,
    name: &str,
) -> Result<Option<i32>> {
    super::select_id(conn, schema, SELECT_GIT_SERVER, name).await
}

pub async fn upsert(conn: &mut PgConnection, schema: &Schema, server: &GitServer) -> Result<i32> {
    let sql = schema.render(UPSERT_GIT_SERVER);
    let id = sqlx::query_scalar::<_, i32>(&sql)
        .bind(&server.name)
        .bind(&server.git_host)
        .bind(&server.git_user)
        .bind(server.ssh_port)
        .bind(server.https_port)
        .bind(&server.private_ssh_key)
        .bind(server.create_code_review_pipeline)
        .bind(server.available)
        .fetch_one(&mut *conn)
        .await?;
    Ok(id)
}

pub async fn insert_action_log(
    conn: &mut PgConnection,
    schema: &Schema,
    server_id: i32,
    action_log_id: i32,
) -> Result<()> {
    super::link(conn, schema, INSERT_ACTION_LOG, server_id, action_log_id).await
}
