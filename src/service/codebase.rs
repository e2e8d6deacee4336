use sqlx::{PgConnection, PgPool};
use tracing::{event, Level};

use crate::db::Schema;
use crate::error::{Error, Result, ResultExt};
use crate::model::codebase::{Codebase, CodebaseRefs, Perf};
use crate::repository::server::ServerTable;
use crate::repository::{self, codebase, git_server, jenkins, perf_data_source, server};

#[derive(Clone)]
pub struct CodebaseService {
    pool: PgPool,
}

impl CodebaseService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates or updates the codebase row, records its action log and links
    /// its perf data sources.
    pub async fn put(&self, codebase: &Codebase) -> Result<i32> {
        self.put_codebase(codebase)
            .await
            .context(|| format!("couldn't put codebase {}", codebase.name))
    }

    async fn put_codebase(&self, cb: &Codebase) -> Result<i32> {
        let schema = &cb.tenant;
        let mut tx = self.pool.begin().await?;

        let refs = resolve_refs(&mut tx, cb).await?;
        let id = match codebase::update(&mut tx, schema, cb, refs).await? {
            Some(id) => {
                event!(Level::DEBUG, codebase = %cb.name, id, "Codebase has been updated.");
                id
            }
            None => {
                let id = codebase::insert(&mut tx, schema, cb, refs).await?;
                event!(Level::INFO, codebase = %cb.name, id, "Codebase has been created.");
                id
            }
        };

        let action_log_id = repository::insert_action_log(&mut tx, schema, &cb.action_log).await?;
        codebase::insert_action(&mut tx, schema, id, action_log_id).await?;
        codebase::update_status(&mut tx, schema, id, &cb.status).await?;

        if let Some(perf) = &cb.perf {
            put_perf_data_sources(&mut tx, schema, id, perf).await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    /// Deletes the codebase row. Rows referencing it go with it.
    pub async fn delete(&self, schema: &Schema, name: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        if let Some(id) = codebase::select_application_id(&mut tx, schema, name).await? {
            perf_data_source::unlink_codebase(&mut tx, schema, id).await?;
        }
        let deleted = codebase::delete(&mut tx, schema, name)
            .await
            .context(|| format!("couldn't delete codebase {name}"))?;
        tx.commit().await?;
        event!(Level::INFO, codebase = %name, deleted, "Codebase has been deleted.");
        Ok(())
    }
}

/// Looks up the rows the codebase points to. The git server is mandatory;
/// every other reference is only checked when it is set.
async fn resolve_refs(conn: &mut PgConnection, cb: &Codebase) -> Result<CodebaseRefs> {
    let schema = &cb.tenant;

    let git_server_id = git_server::select_id(conn, schema, &cb.git_server)
        .await?
        .ok_or_else(|| Error::not_found("git server", &cb.git_server))?;

    let jira_server_id = match non_empty(&cb.jira_server) {
        Some(name) => server::select_id(conn, schema, ServerTable::Jira, name).await?,
        None => None,
    };

    let jenkins_slave_id = match non_empty(&cb.jenkins_slave) {
        Some(name) => Some(
            jenkins::select_slave_id(conn, schema, name)
                .await?
                .ok_or_else(|| Error::not_found("jenkins slave", name))?,
        ),
        None => None,
    };

    let job_provisioning_id = match non_empty(&cb.job_provisioning) {
        Some(name) => Some(
            jenkins::select_job_provisioning_id(conn, schema, name, jenkins::CI_SCOPE)
                .await?
                .ok_or_else(|| Error::not_found("job provisioning", name))?,
        ),
        None => None,
    };

    let perf_server_id = match &cb.perf {
        Some(perf) => Some(
            server::select_id(conn, schema, ServerTable::Perf, &perf.name)
                .await?
                .ok_or_else(|| Error::not_found("perf server", &perf.name))?,
        ),
        None => None,
    };

    Ok(CodebaseRefs {
        git_server_id,
        jira_server_id,
        jenkins_slave_id,
        job_provisioning_id,
        perf_server_id,
    })
}

async fn put_perf_data_sources(
    conn: &mut PgConnection,
    schema: &Schema,
    codebase_id: i32,
    perf: &Perf,
) -> Result<()> {
    for type_ in &perf.data_sources {
        let data_source_id = perf_data_source::get_or_insert(conn, schema, type_).await?;
        perf_data_source::link_codebase(conn, schema, codebase_id, data_source_id).await?;
    }
    Ok(())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_references_are_unset() {
        assert_eq!(non_empty(&None), None);
        assert_eq!(non_empty(&Some(String::new())), None);
        assert_eq!(non_empty(&Some("gradle".to_owned())), Some("gradle"));
    }
}
