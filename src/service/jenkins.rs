use sqlx::PgPool;
use tracing::{event, Level};

use crate::db::Schema;
use crate::error::{Error, Result, ResultExt};
use crate::model::ActionLog;
use crate::repository::{self, cd_pipeline, jenkins};

#[derive(Clone)]
pub struct JenkinsSlaveService {
    pool: PgPool,
}

impl JenkinsSlaveService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registers every named slave not known yet. Returns how many were added.
    pub async fn put<'a, I>(&self, schema: &Schema, slaves: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut tx = self.pool.begin().await?;
        let mut added = 0;
        for name in slaves {
            if name.is_empty() {
                continue;
            }
            if jenkins::insert_slave(&mut tx, schema, name)
                .await
                .context(|| format!("couldn't put jenkins slave {name}"))?
            {
                added += 1;
            }
        }
        tx.commit().await?;
        event!(Level::INFO, schema = %schema, added, "Jenkins slaves have been saved.");
        Ok(added)
    }
}

#[derive(Clone)]
pub struct JobProvisioningService {
    pool: PgPool,
}

impl JobProvisioningService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registers every `(name, scope)` job provisioner not known yet.
    pub async fn put<'a, I>(&self, schema: &Schema, provisioners: I) -> Result<usize>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut tx = self.pool.begin().await?;
        let mut added = 0;
        for (name, scope) in provisioners {
            if jenkins::insert_job_provisioning(&mut tx, schema, name, scope)
                .await
                .context(|| format!("couldn't put job provisioning {name} ({scope})"))?
            {
                added += 1;
            }
        }
        tx.commit().await?;
        event!(Level::INFO, schema = %schema, added, "Job provisioners have been saved.");
        Ok(added)
    }
}

#[derive(Clone)]
pub struct JenkinsJobService {
    pool: PgPool,
}

impl JenkinsJobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records the progress of a jenkins job against the cd pipeline that
    /// owns its stage.
    pub async fn put_action_log(
        &self,
        schema: &Schema,
        pipeline: &str,
        action_log: &ActionLog,
    ) -> Result<i32> {
        let mut tx = self.pool.begin().await?;
        let row = cd_pipeline::select(&mut tx, schema, pipeline)
            .await?
            .ok_or_else(|| Error::not_found("cd pipeline", pipeline))?;
        let action_log_id = repository::insert_action_log(&mut tx, schema, action_log).await?;
        cd_pipeline::insert_action(&mut tx, schema, row.id, action_log_id).await?;
        tx.commit().await?;
        event!(
            Level::INFO,
            cd_pipeline = %pipeline,
            action = %action_log.action,
            "Jenkins job action has been saved."
        );
        Ok(action_log_id)
    }
}
