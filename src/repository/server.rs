//! `jira_server` and `perf_server` share the `(name, available)` layout.

use sqlx::PgConnection;

use crate::db::Schema;
use crate::error::Result;
use crate::model::server::Server;

/// Tables holding [`Server`] rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServerTable {
    Jira,
    Perf,
}

impl ServerTable {
    fn select(self) -> &'static str {
        match self {
            ServerTable::Jira => "select id from {schema}.jira_server where name = $1;",
            ServerTable::Perf => "select id from {schema}.perf_server where name = $1;",
        }
    }

    fn upsert(self) -> &'static str {
        match self {
            ServerTable::Jira => {
                "insert into {schema}.jira_server(name, available) values ($1, $2) \
                 on conflict (name) do update set available = excluded.available returning id;"
            }
            ServerTable::Perf => {
                "insert into {schema}.perf_server(name, available) values ($1, $2) \
                 on conflict (name) do update set available = excluded.available returning id;"
            }
        }
    }
}

pub async fn select_id(
    conn: &mut PgConnection,
    schema: &Schema,
    table: ServerTable,
    name: &str,
) -> Result<Option<i32>> {
    super::select_id(conn, schema, table.select(), name).await
}

pub async fn upsert(
    conn: &mut PgConnection,
    schema: &Schema,
    table: ServerTable,
    server: &Server,
) -> Result<i32> {
    let sql = schema.render(table.upsert());
    let id = sqlx::query_scalar::<_, i32>(&sql)
        .bind(&server.name)
        .bind(server.available)
        .fetch_one(&mut *conn)
        .await?;
    Ok(id)
}
