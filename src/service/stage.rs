use sqlx::{PgConnection, PgPool};
use tracing::{event, Level};

use crate::db::Schema;
use crate::error::{Error, Result, ResultExt};
use crate::model::stage::{self as model, QualityGate, Stage};
use crate::repository::stage::{StageRefs, StageRow};
use crate::repository::{
    self, cd_pipeline, codebase, codebase_branch, docker_stream, jenkins, stage,
};

#[derive(Clone)]
pub struct StageService {
    pool: PgPool,
}

/// The pipeline a stage belongs to, as far as docker stream relations are
/// concerned.
pub(super) struct PipelineRef<'a> {
    pub id: i32,
    pub name: &'a str,
    pub applications_to_promote: &'a [String],
}

impl StageService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates or updates the stage row with its quality gates and docker
    /// stream relations, then records its action log.
    pub async fn put(&self, cd_stage: &Stage) -> Result<i32> {
        self.put_stage(cd_stage).await.context(|| {
            format!(
                "couldn't put stage {} of cd pipeline {}",
                cd_stage.name, cd_stage.cd_pipeline_name
            )
        })
    }

    async fn put_stage(&self, cd_stage: &Stage) -> Result<i32> {
        let schema = &cd_stage.tenant;
        let mut tx = self.pool.begin().await?;

        let pipeline_row = cd_pipeline::select(&mut tx, schema, &cd_stage.cd_pipeline_name)
            .await?
            .ok_or_else(|| Error::not_found("cd pipeline", &cd_stage.cd_pipeline_name))?;
        let applications =
            cd_pipeline::select_applications(&mut tx, schema, pipeline_row.id).await?;
        let pipeline = PipelineRef {
            id: pipeline_row.id,
            name: &pipeline_row.name,
            applications_to_promote: &applications,
        };

        let id = match stage::select(&mut tx, schema, &cd_stage.name, pipeline.id).await? {
            Some(row) => {
                stage::update(&mut tx, schema, row.id, cd_stage).await?;
                stage::delete_quality_gates(&mut tx, schema, row.id).await?;
                insert_quality_gates(&mut tx, schema, row.id, &cd_stage.quality_gates).await?;
                stage::delete_relations(&mut tx, schema, row.id).await?;
                put_relations(&mut tx, schema, &pipeline, &row).await?;
                event!(Level::DEBUG, stage = %cd_stage.name, id = row.id, "Stage has been updated.");
                row.id
            }
            None => {
                let refs = resolve_refs(&mut tx, schema, pipeline.id, cd_stage).await?;
                let id = stage::insert(&mut tx, schema, cd_stage, refs).await?;
                insert_quality_gates(&mut tx, schema, id, &cd_stage.quality_gates).await?;
                let row = StageRow {
                    id,
                    name: cd_stage.name.clone(),
                    order: cd_stage.order,
                };
                put_relations(&mut tx, schema, &pipeline, &row).await?;
                event!(Level::INFO, stage = %cd_stage.name, id, "Stage has been created.");
                id
            }
        };

        let action_log_id =
            repository::insert_action_log(&mut tx, schema, &cd_stage.action_log).await?;
        stage::insert_action_log(&mut tx, schema, id, action_log_id).await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Deletes the stage, its docker stream relations and the verified
    /// streams it promoted into. Later stages of the pipeline are relinked to
    /// what remains before them.
    pub async fn delete(&self, schema: &Schema, pipeline: &str, name: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let Some(pipeline_row) = cd_pipeline::select(&mut tx, schema, pipeline).await? else {
            event!(Level::DEBUG, cd_pipeline = %pipeline, "CD pipeline is already gone.");
            return Ok(());
        };
        if let Some(row) = stage::select(&mut tx, schema, name, pipeline_row.id).await? {
            let produced = stage::select_produced_streams(&mut tx, schema, row.id).await?;
            stage::delete_relations(&mut tx, schema, row.id).await?;
            stage::delete(&mut tx, schema, row.id).await?;

            let applications =
                cd_pipeline::select_applications(&mut tx, schema, pipeline_row.id).await?;
            let pipeline_ref = PipelineRef {
                id: pipeline_row.id,
                name: &pipeline_row.name,
                applications_to_promote: &applications,
            };
            let following = stage::select_for_pipeline(&mut tx, schema, pipeline_row.id)
                .await?
                .into_iter()
                .filter(|later| later.order > row.order);
            for later in following {
                stage::delete_relations(&mut tx, schema, later.id).await?;
                put_relations(&mut tx, schema, &pipeline_ref, &later).await?;
            }

            let streams = docker_stream::delete_unused(&mut tx, schema, &produced).await?;
            event!(
                Level::INFO,
                stage = %name,
                cd_pipeline = %pipeline,
                streams,
                "Stage has been deleted."
            );
        }
        tx.commit().await?;
        Ok(())
    }
}

/// Foreign keys a new stage row needs: the `cd` job provisioner and, for
/// library sourced stages, the library codebase and branch.
async fn resolve_refs(
    conn: &mut PgConnection,
    schema: &Schema,
    pipeline_id: i32,
    cd_stage: &Stage,
) -> Result<StageRefs> {
    let job_provisioning_id = if cd_stage.job_provisioning.is_empty() {
        None
    } else {
        let name = &cd_stage.job_provisioning;
        Some(
            jenkins::select_job_provisioning_id(conn, schema, name, jenkins::CD_SCOPE)
                .await?
                .ok_or_else(|| Error::not_found("job provisioning", name))?,
        )
    };

    let (library_id, branch_id) = if cd_stage.source.is_library() {
        let library = &cd_stage.source.library;
        let library_id = codebase::select_id(conn, schema, &library.name)
            .await?
            .ok_or_else(|| Error::not_found("library", &library.name))?;
        let branch_id = codebase_branch::select_id(conn, schema, &library.branch, library_id)
            .await?
            .ok_or_else(|| Error::not_found("codebase branch", &library.branch))?;
        (Some(library_id), Some(branch_id))
    } else {
        (None, None)
    };

    Ok(StageRefs {
        pipeline_id,
        job_provisioning_id,
        library_id,
        branch_id,
    })
}

/// Autotest gates point at the codebase and branch running the tests.
async fn insert_quality_gates(
    conn: &mut PgConnection,
    schema: &Schema,
    stage_id: i32,
    gates: &[QualityGate],
) -> Result<()> {
    for gate in gates {
        let (codebase_id, branch_id) = match (&gate.autotest_name, &gate.branch_name) {
            (Some(autotest), Some(branch)) => {
                let codebase_id = codebase::select_id(conn, schema, autotest)
                    .await?
                    .ok_or_else(|| Error::not_found("autotest", autotest))?;
                let branch_id = codebase_branch::select_id(conn, schema, branch, codebase_id)
                    .await?
                    .ok_or_else(|| Error::not_found("codebase branch", branch))?;
                (Some(codebase_id), Some(branch_id))
            }
            _ => (None, None),
        };
        stage::insert_quality_gate(conn, schema, stage_id, gate, codebase_id, branch_id).await?;
    }
    Ok(())
}

/// Records, for every input stream of the pipeline, which stream the stage
/// consumes and which one it produces.
///
/// The first stage consumes the pipeline's input. Later stages consume the
/// output of the closest previous stage for the same codebase, or the
/// pipeline's input when there is none. A stage promotes a codebase into its
/// own verified stream only when the pipeline promotes that application;
/// otherwise its output is its input.
pub(super) async fn put_relations(
    conn: &mut PgConnection,
    schema: &Schema,
    pipeline: &PipelineRef<'_>,
    row: &StageRow,
) -> Result<()> {
    let inputs = cd_pipeline::select_docker_streams(conn, schema, pipeline.id).await?;
    for pipeline_stream in inputs {
        let (codebase_id, codebase_name) =
            docker_stream::select_codebase(conn, schema, pipeline_stream)
                .await?
                .ok_or_else(|| {
                    Error::not_found("codebase docker stream", pipeline_stream.to_string())
                })?;

        let input = if row.order == 0 {
            pipeline_stream
        } else {
            stage::select_previous_output(conn, schema, pipeline.id, row.order, codebase_id)
                .await?
                .unwrap_or(pipeline_stream)
        };

        let promoted = pipeline
            .applications_to_promote
            .iter()
            .any(|application| *application == codebase_name);
        let output = if promoted {
            let name = model::verified_stream_name(pipeline.name, &row.name, &codebase_name);
            docker_stream::get_or_insert(conn, schema, codebase_id, &name).await?
        } else {
            input
        };

        stage::insert_relation(conn, schema, row.id, input, output).await?;
    }
    event!(
        Level::DEBUG,
        stage = %row.name,
        cd_pipeline = %pipeline.name,
        "Docker stream relations have been rebuilt."
    );
    Ok(())
}
