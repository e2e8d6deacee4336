use sqlx::PgPool;
use tracing::{event, Level};

use crate::db::Schema;
use crate::error::{Error, Result, ResultExt};
use crate::model::codebase_branch::CodebaseBranch;
use crate::repository::{self, codebase, codebase_branch, docker_stream};

#[derive(Clone)]
pub struct CodebaseBranchService {
    pool: PgPool,
}

impl CodebaseBranchService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn put(&self, branch: &CodebaseBranch) -> Result<i32> {
        self.put_branch(branch).await.context(|| {
            format!(
                "couldn't put branch {} of codebase {}",
                branch.name, branch.app_name
            )
        })
    }

    async fn put_branch(&self, branch: &CodebaseBranch) -> Result<i32> {
        let schema = &branch.tenant;
        let mut tx = self.pool.begin().await?;

        let codebase_id = codebase::select_id(&mut tx, schema, &branch.app_name)
            .await?
            .ok_or_else(|| Error::not_found("codebase", &branch.app_name))?;

        let existing =
            codebase_branch::select_id(&mut tx, schema, &branch.name, codebase_id).await?;
        let id = match existing {
            Some(id) => {
                codebase_branch::update(&mut tx, schema, id, branch).await?;
                id
            }
            None => {
                let id = codebase_branch::insert(&mut tx, schema, branch, codebase_id).await?;
                let stream = branch.docker_stream_name();
                let stream_id = match docker_stream::select_id(&mut tx, schema, &stream).await? {
                    Some(stream_id) => stream_id,
                    None => {
                        docker_stream::insert(&mut tx, schema, codebase_id, &stream, Some(id))
                            .await?
                    }
                };
                codebase_branch::set_output_stream(&mut tx, schema, id, stream_id).await?;
                event!(
                    Level::INFO,
                    branch = %branch.name,
                    codebase = %branch.app_name,
                    stream = %stream,
                    "Codebase branch has been created."
                );
                id
            }
        };

        let action_log_id =
            repository::insert_action_log(&mut tx, schema, &branch.action_log).await?;
        codebase_branch::insert_action_log(&mut tx, schema, id, action_log_id).await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Deletes the branch together with the image streams built from it. A
    /// branch whose codebase is already gone has nothing left to delete.
    pub async fn delete(&self, schema: &Schema, codebase_name: &str, name: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let Some(codebase_id) = codebase::select_id(&mut tx, schema, codebase_name).await? else {
            event!(Level::DEBUG, codebase = %codebase_name, "Codebase is already gone.");
            return Ok(());
        };
        if let Some(id) = codebase_branch::select_id(&mut tx, schema, name, codebase_id).await? {
            docker_stream::delete_for_branch(&mut tx, schema, id).await?;
            codebase_branch::delete(&mut tx, schema, id).await?;
        }
        tx.commit().await?;
        event!(
            Level::INFO,
            branch = %name,
            codebase = %codebase_name,
            "Codebase branch has been deleted."
        );
        Ok(())
    }
}
