use sqlx::{FromRow, PgConnection};

use crate::db::Schema;
use crate::error::Result;
use crate::model::stage::{QualityGate, Stage};

const SELECT_STAGE: &str = "select id, name, \"order\" from {schema}.cd_stage \
    where name = $1 and cd_pipeline_id = $2;";
const SELECT_PIPELINE_STAGES: &str = "select id, name, \"order\" from {schema}.cd_stage \
    where cd_pipeline_id = $1 order by \"order\";";
const INSERT_STAGE: &str = "insert into {schema}.cd_stage(name, cd_pipeline_id, description, trigger_type, \"order\", status, \
    job_provisioning_id, source_type, source_library_id, source_branch_id) \
    values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) returning id;";
const UPDATE_STAGE: &str =
    "update {schema}.cd_stage set status = $1, description = $2, trigger_type = $3 where id = $4;";
const DELETE_STAGE: &str = "delete from {schema}.cd_stage where id = $1;";
const INSERT_ACTION_LOG: &str =
    "insert into {schema}.cd_stage_action_log(cd_stage_id, action_log_id) values ($1, $2);";

const INSERT_QUALITY_GATE: &str = "insert into {schema}.quality_gate_stage(quality_gate, step_name, cd_stage_id, codebase_id, \
    codebase_branch_id) values ($1, $2, $3, $4, $5);";
const DELETE_QUALITY_GATES: &str = "delete from {schema}.quality_gate_stage where cd_stage_id = $1;";

const INSERT_RELATION: &str = "insert into {schema}.stage_codebase_docker_stream(cd_stage_id, input_codebase_docker_stream_id, \
    output_codebase_docker_stream_id) values ($1, $2, $3);";
const DELETE_RELATIONS: &str =
    "delete from {schema}.stage_codebase_docker_stream where cd_stage_id = $1;";
/// Outputs that differ from their input were produced by the stage itself.
const SELECT_PRODUCED_STREAMS: &str = "select output_codebase_docker_stream_id from {schema}.stage_codebase_docker_stream \
    where cd_stage_id = $1 and output_codebase_docker_stream_id <> input_codebase_docker_stream_id;";
const SELECT_PIPELINE_PRODUCED_STREAMS: &str = "select scds.output_codebase_docker_stream_id \
    from {schema}.stage_codebase_docker_stream scds \
    join {schema}.cd_stage s on s.id = scds.cd_stage_id \
    join {schema}.cd_pipeline p on p.id = s.cd_pipeline_id \
    where p.name = $1 and scds.output_codebase_docker_stream_id <> scds.input_codebase_docker_stream_id;";
const SELECT_PREVIOUS_OUTPUT: &str = "select scds.output_codebase_docker_stream_id \
    from {schema}.stage_codebase_docker_stream scds \
    join {schema}.cd_stage s on s.id = scds.cd_stage_id \
    join {schema}.codebase_docker_stream cds on cds.id = scds.output_codebase_docker_stream_id \
    where s.cd_pipeline_id = $1 and s.\"order\" < $2 and cds.codebase_id = $3 \
    order by s.\"order\" desc limit 1;";

/// The part of a `cd_stage` row needed to rebuild its relations.
#[derive(Clone, Debug, PartialEq, FromRow)]
pub struct StageRow {
    pub id: i32,
    pub name: String,
    pub order: i32,
}

/// Foreign keys of a new `cd_stage` row.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StageRefs {
    pub pipeline_id: i32,
    pub job_provisioning_id: Option<i32>,
    pub library_id: Option<i32>,
    pub branch_id: Option<i32>,
}

pub async fn select(
    conn: &mut PgConnection,
    schema: &Schema,
    name: &str,
    pipeline_id: i32,
) -> Result<Option<StageRow>> {
    let sql = schema.render(SELECT_STAGE);
    let row = sqlx::query_as::<_, StageRow>(&sql)
        .bind(name)
        .bind(pipeline_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

/// Stages of the pipeline ordered by their `order`.
pub async fn select_for_pipeline(
    conn: &mut PgConnection,
    schema: &Schema,
    pipeline_id: i32,
) -> Result<Vec<StageRow>> {
    let sql = schema.render(SELECT_PIPELINE_STAGES);
    let rows = sqlx::query_as::<_, StageRow>(&sql)
        .bind(pipeline_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows)
}

pub async fn insert(
    conn: &mut PgConnection,
    schema: &Schema,
    stage: &Stage,
    refs: StageRefs,
) -> Result<i32> {
    let sql = schema.render(INSERT_STAGE);
    let id = sqlx::query_scalar::<_, i32>(&sql)
        .bind(&stage.name)
        .bind(refs.pipeline_id)
        .bind(&stage.description)
        .bind(&stage.trigger_type)
        .bind(stage.order)
        .bind(&stage.status)
        .bind(refs.job_provisioning_id)
        .bind(&stage.source.type_)
        .bind(refs.library_id)
        .bind(refs.branch_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(id)
}

pub async fn update(
    conn: &mut PgConnection,
    schema: &Schema,
    id: i32,
    stage: &Stage,
) -> Result<()> {
    let sql = schema.render(UPDATE_STAGE);
    sqlx::query(&sql)
        .bind(&stage.status)
        .bind(&stage.description)
        .bind(&stage.trigger_type)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn delete(conn: &mut PgConnection, schema: &Schema, id: i32) -> Result<()> {
    let sql = schema.render(DELETE_STAGE);
    sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
    Ok(())
}

pub async fn insert_action_log(
    conn: &mut PgConnection,
    schema: &Schema,
    stage_id: i32,
    action_log_id: i32,
) -> Result<()> {
    super::link(conn, schema, INSERT_ACTION_LOG, stage_id, action_log_id).await
}

pub async fn insert_quality_gate(
    conn: &mut PgConnection,
    schema: &Schema,
    stage_id: i32,
    gate: &QualityGate,
    codebase_id: Option<i32>,
    branch_id: Option<i32>,
) -> Result<()> {
    let sql = schema.render(INSERT_QUALITY_GATE);
    sqlx::query(&sql)
        .bind(&gate.quality_gate)
        .bind(&gate.jenkins_step_name)
        .bind(stage_id)
        .bind(codebase_id)
        .bind(branch_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn delete_quality_gates(
    conn: &mut PgConnection,
    schema: &Schema,
    stage_id: i32,
) -> Result<()> {
    let sql = schema.render(DELETE_QUALITY_GATES);
    sqlx::query(&sql)
        .bind(stage_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn insert_relation(
    conn: &mut PgConnection,
    schema: &Schema,
    stage_id: i32,
    input_id: i32,
    output_id: i32,
) -> Result<()> {
    let sql = schema.render(INSERT_RELATION);
    sqlx::query(&sql)
        .bind(stage_id)
        .bind(input_id)
        .bind(output_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn delete_relations(
    conn: &mut PgConnection,
    schema: &Schema,
    stage_id: i32,
) -> Result<()> {
    let sql = schema.render(DELETE_RELATIONS);
    sqlx::query(&sql)
        .bind(stage_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Verified streams the stage promotes into.
pub async fn select_produced_streams(
    conn: &mut PgConnection,
    schema: &Schema,
    stage_id: i32,
) -> Result<Vec<i32>> {
    let sql = schema.render(SELECT_PRODUCED_STREAMS);
    let ids = sqlx::query_scalar::<_, i32>(&sql)
        .bind(stage_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(ids)
}

/// Verified streams promoted into by any stage of the pipeline `pipeline`.
pub async fn select_pipeline_produced_streams(
    conn: &mut PgConnection,
    schema: &Schema,
    pipeline: &str,
) -> Result<Vec<i32>> {
    let sql = schema.render(SELECT_PIPELINE_PRODUCED_STREAMS);
    let ids = sqlx::query_scalar::<_, i32>(&sql)
        .bind(pipeline)
        .fetch_all(&mut *conn)
        .await?;
    Ok(ids)
}

/// Output stream of `codebase_id` of the closest stage before `order`.
pub async fn select_previous_output(
    conn: &mut PgConnection,
    schema: &Schema,
    pipeline_id: i32,
    order: i32,
    codebase_id: i32,
) -> Result<Option<i32>> {
    let sql = schema.render(SELECT_PREVIOUS_OUTPUT);
    let id = sqlx::query_scalar::<_, i32>(&sql)
        .bind(pipeline_id)
        .bind(order)
        .bind(codebase_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(id)
}
