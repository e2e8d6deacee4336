use sqlx::postgres::PgArguments;
use sqlx::query::QueryScalar;
use sqlx::{PgConnection, Postgres};

use crate::db::Schema;
use crate::error::Result;
use crate::model::codebase::{Codebase, CodebaseRefs};

const INSERT_CODEBASE: &str = "insert into {schema}.codebase(name, type, language, framework, build_tool, strategy, repository_url, \
    status, test_report_framework, description, git_server_id, git_project_path, jenkins_slave_id, job_provisioning_id, \
    deployment_script, project_status, versioning_type, start_versioning_from, jira_server_id, commit_message_pattern, \
    ticket_name_pattern, ci_tool, perf_server_id, default_branch, jira_issue_metadata_payload, empty_project) \
    values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26) \
    returning id;";
const UPDATE_CODEBASE: &str = "update {schema}.codebase set type = $2, language = $3, framework = $4, build_tool = $5, \
    strategy = $6, repository_url = $7, status = $8, test_report_framework = $9, description = $10, git_server_id = $11, \
    git_project_path = $12, jenkins_slave_id = $13, job_provisioning_id = $14, deployment_script = $15, project_status = $16, \
    versioning_type = $17, start_versioning_from = $18, jira_server_id = $19, commit_message_pattern = $20, \
    ticket_name_pattern = $21, ci_tool = $22, perf_server_id = $23, default_branch = $24, jira_issue_metadata_payload = $25, \
    empty_project = $26 where name = $1 returning id;";
const SELECT_CODEBASE: &str = "select id from {schema}.codebase where name = $1;";
const SELECT_APPLICATION: &str =
    "select id from {schema}.codebase where name = $1 and type = 'application';";
const UPDATE_STATUS: &str = "update {schema}.codebase set status = $1 where id = $2;";
const DELETE_CODEBASE: &str = "delete from {schema}.codebase where name = $1;";
const INSERT_CODEBASE_ACTION: &str =
    "insert into {schema}.codebase_action(codebase_id, action_log_id) values ($1, $2);";

pub async fn select_id(
    conn: &mut PgConnection,
    schema: &Schema,
    name: &str,
) -> Result<Option<i32>> {
    super::select_id(conn, schema, SELECT_CODEBASE, name).await
}

/// Id of the codebase `name` when it is an application.
pub async fn select_application_id(
    conn: &mut PgConnection,
    schema: &Schema,
    name: &str,
) -> Result<Option<i32>> {
    super::select_id(conn, schema, SELECT_APPLICATION, name).await
}

pub async fn insert(
    conn: &mut PgConnection,
    schema: &Schema,
    codebase: &Codebase,
    refs: CodebaseRefs,
) -> Result<i32> {
    let sql = schema.render(INSERT_CODEBASE);
    let id = bind_columns(sqlx::query_scalar::<_, i32>(&sql), codebase, refs)
        .fetch_one(&mut *conn)
        .await?;
    Ok(id)
}

/// Rewrites every column of the codebase row with the same name, returning
/// its id.
pub async fn update(
    conn: &mut PgConnection,
    schema: &Schema,
    codebase: &Codebase,
    refs: CodebaseRefs,
) -> Result<Option<i32>> {
    let sql = schema.render(UPDATE_CODEBASE);
    let id = bind_columns(sqlx::query_scalar::<_, i32>(&sql), codebase, refs)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(id)
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
    let sql = schema.render(DELETE_CODEBASE);
    let deleted = sqlx::query(&sql)
        .bind(name)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    Ok(deleted)
}

pub async fn insert_action(
    conn: &mut PgConnection,
    schema: &Schema,
    codebase_id: i32,
    action_log_id: i32,
) -> Result<()> {
    super::link(conn, schema, INSERT_CODEBASE_ACTION, codebase_id, action_log_id).await
}

type CodebaseQuery<'q> = QueryScalar<'q, Postgres, i32, PgArguments>;

/// Binds `$1..$26` in the column order shared by the insert and update
/// statements.
fn bind_columns<'q>(
    query: CodebaseQuery<'q>,
    codebase: &'q Codebase,
    refs: CodebaseRefs,
) -> CodebaseQuery<'q> {
    query
        .bind(&codebase.name)
        .bind(&codebase.type_)
        .bind(&codebase.language)
        .bind(codebase.framework.as_deref())
        .bind(&codebase.build_tool)
        .bind(&codebase.strategy)
        .bind(&codebase.repository_url)
        .bind(&codebase.status)
        .bind(&codebase.test_report_framework)
        .bind(&codebase.description)
        .bind(refs.git_server_id)
        .bind(codebase.git_url_path.as_deref())
        .bind(refs.jenkins_slave_id)
        .bind(refs.job_provisioning_id)
        .bind(&codebase.deployment_script)
        .bind(codebase.project_status())
        .bind(&codebase.versioning_type)
        .bind(codebase.start_versioning_from.as_deref())
        .bind(refs.jira_server_id)
        .bind(codebase.commit_message_pattern.as_deref())
        .bind(codebase.ticket_name_pattern.as_deref())
        .bind(&codebase.ci_tool)
        .bind(refs.perf_server_id)
        .bind(&codebase.default_branch)
        .bind(codebase.jira_issue_metadata_payload.as_deref())
        .bind(codebase.empty_project)
}
