use sqlx::PgPool;
use tracing::{event, Level};

use crate::db::infrastructure;
use crate::error::{Result, ResultExt};
use crate::model::git_server::GitServer;
use crate::model::server::Server;
use crate::repository::server::{self, ServerTable};
use crate::repository::{self, git_server};

#[derive(Clone)]
pub struct GitServerService {
    pool: PgPool,
}

impl GitServerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts the git server and records its action log. Returns `None`
    /// without touching the database when the tenant schema has not been
    /// created yet.
    pub async fn put(&self, server: &GitServer) -> Result<Option<i32>> {
        if !infrastructure::schema_exists(&self.pool, &server.tenant).await? {
            event!(
                Level::WARN,
                git_server = %server.name,
                schema = %server.tenant,
                "Tenant schema does not exist, git server is not saved."
            );
            return Ok(None);
        }

        let schema = &server.tenant;
        let mut tx = self.pool.begin().await?;
        let id = git_server::upsert(&mut tx, schema, server)
            .await
            .context(|| format!("couldn't put git server {}", server.name))?;
        let action_log_id =
            repository::insert_action_log(&mut tx, schema, &server.action_log).await?;
        git_server::insert_action_log(&mut tx, schema, id, action_log_id).await?;
        tx.commit().await?;

        event!(Level::INFO, git_server = %server.name, id, "Git server has been saved.");
        Ok(Some(id))
    }
}

/// Upserts `(name, available)` rows into one of the server tables.
#[derive(Clone)]
struct ServerService {
    pool: PgPool,
    table: ServerTable,
}

impl ServerService {
    async fn put(&self, server: &Server) -> Result<i32> {
        let mut tx = self.pool.begin().await?;
        let id = server::upsert(&mut tx, &server.tenant, self.table, server)
            .await
            .context(|| format!("couldn't put {:?} server {}", self.table, server.name))?;
        tx.commit().await?;
        event!(
            Level::INFO,
            server = %server.name,
            available = server.available,
            "{:?} server has been saved.",
            self.table
        );
        Ok(id)
    }
}

#[derive(Clone)]
pub struct JiraServerService(ServerService);

impl JiraServerService {
    pub fn new(pool: PgPool) -> Self {
        Self(ServerService {
            pool,
            table: ServerTable::Jira,
        })
    }

    pub async fn put(&self, server: &Server) -> Result<i32> {
        self.0.put(server).await
    }
}

#[derive(Clone)]
pub struct PerfServerService(ServerService);

impl PerfServerService {
    pub fn new(pool: PgPool) -> Self {
        Self(ServerService {
            pool,
            table: ServerTable::Perf,
        })
    }

    pub async fn put(&self, server: &Server) -> Result<i32> {
        self.0.put(server).await
    }
}
