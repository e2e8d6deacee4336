use sqlx::{PgConnection, PgPool};
use tracing::{event, Level};

use super::stage::{put_relations, PipelineRef};
use crate::db::Schema;
use crate::error::{Error, Result, ResultExt};
use crate::model::cd_pipeline::CDPipeline;
use crate::repository::cd_pipeline::CDPipelineRow;
use crate::repository::{self, cd_pipeline, codebase, docker_stream, stage};

#[derive(Clone)]
pub struct CDPipelineService {
    pool: PgPool,
}

impl CDPipelineService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the pipeline row or brings an existing one in line with the
    /// resource: input streams, stage relations and promoted applications are
    /// all rebuilt.
    pub async fn put(&self, pipeline: &CDPipeline) -> Result<i32> {
        self.put_pipeline(pipeline)
            .await
            .context(|| format!("couldn't put cd pipeline {}", pipeline.name))
    }

    async fn put_pipeline(&self, pipeline: &CDPipeline) -> Result<i32> {
        let schema = &pipeline.tenant;
        let mut tx = self.pool.begin().await?;

        let row = match cd_pipeline::select(&mut tx, schema, &pipeline.name).await? {
            Some(row) => {
                update_pipeline(&mut tx, schema, &row, pipeline).await?;
                row
            }
            None => create_pipeline(&mut tx, schema, pipeline).await?,
        };

        if row.status.as_deref() != Some(pipeline.status.as_str()) {
            cd_pipeline::update_status(&mut tx, schema, row.id, &pipeline.status).await?;
        }

        let action_log_id =
            repository::insert_action_log(&mut tx, schema, &pipeline.action_log).await?;
        cd_pipeline::insert_action(&mut tx, schema, row.id, action_log_id).await?;

        tx.commit().await?;
        event!(Level::INFO, cd_pipeline = %pipeline.name, id = row.id, "CD pipeline has been saved.");
        Ok(row.id)
    }

    /// Deletes the pipeline along with the verified streams its stages
    /// promoted into. Stages and link rows go with the pipeline row.
    pub async fn delete(&self, schema: &Schema, name: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let produced = stage::select_pipeline_produced_streams(&mut tx, schema, name).await?;
        let deleted = cd_pipeline::delete(&mut tx, schema, name)
            .await
            .context(|| format!("couldn't delete cd pipeline {name}"))?;
        let streams = docker_stream::delete_unused(&mut tx, schema, &produced).await?;
        tx.commit().await?;
        event!(Level::INFO, cd_pipeline = %name, deleted, streams, "CD pipeline has been deleted.");
        Ok(())
    }
}

async fn create_pipeline(
    conn: &mut PgConnection,
    schema: &Schema,
    pipeline: &CDPipeline,
) -> Result<CDPipelineRow> {
    let row = cd_pipeline::insert(
        conn,
        schema,
        &pipeline.name,
        &pipeline.deployment_type,
        &pipeline.status,
    )
    .await?;
    insert_docker_streams(conn, schema, row.id, &pipeline.input_docker_streams).await?;
    insert_applications(conn, schema, row.id, &pipeline.applications_to_promote).await?;
    event!(Level::DEBUG, cd_pipeline = %pipeline.name, id = row.id, "CD pipeline has been created.");
    Ok(row)
}

async fn update_pipeline(
    conn: &mut PgConnection,
    schema: &Schema,
    row: &CDPipelineRow,
    pipeline: &CDPipeline,
) -> Result<()> {
    cd_pipeline::delete_docker_streams(conn, schema, row.id).await?;
    insert_docker_streams(conn, schema, row.id, &pipeline.input_docker_streams).await?;

    let pipeline_ref = PipelineRef {
        id: row.id,
        name: &row.name,
        applications_to_promote: &pipeline.applications_to_promote,
    };
    let stages = stage::select_for_pipeline(conn, schema, row.id).await?;
    let mut produced = Vec::new();
    for stage_row in &stages {
        produced.extend(stage::select_produced_streams(conn, schema, stage_row.id).await?);
        stage::delete_relations(conn, schema, stage_row.id).await?;
        put_relations(conn, schema, &pipeline_ref, stage_row).await?;
    }
    // Applications no longer promoted leave their verified streams behind.
    let streams = docker_stream::delete_unused(conn, schema, &produced).await?;

    cd_pipeline::delete_applications(conn, schema, row.id).await?;
    insert_applications(conn, schema, row.id, &pipeline.applications_to_promote).await?;
    event!(
        Level::DEBUG,
        cd_pipeline = %pipeline.name,
        stages = stages.len(),
        streams,
        "CD pipeline has been updated."
    );
    Ok(())
}

/// Links the input streams, all of which must already be registered.
async fn insert_docker_streams(
    conn: &mut PgConnection,
    schema: &Schema,
    pipeline_id: i32,
    streams: &[String],
) -> Result<()> {
    for stream in streams {
        let stream_id = docker_stream::select_id(conn, schema, stream)
            .await?
            .ok_or_else(|| Error::not_found("codebase docker stream", stream))?;
        cd_pipeline::insert_docker_stream(conn, schema, pipeline_id, stream_id).await?;
    }
    Ok(())
}

async fn insert_applications(
    conn: &mut PgConnection,
    schema: &Schema,
    pipeline_id: i32,
    applications: &[String],
) -> Result<()> {
    for application in applications {
        let codebase_id = codebase::select_application_id(conn, schema, application)
            .await?
            .ok_or_else(|| Error::not_found("application", application))?;
        cd_pipeline::insert_application(conn, schema, pipeline_id, codebase_id).await?;
    }
    Ok(())
}
