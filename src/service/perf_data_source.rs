use sqlx::PgPool;
use tracing::{event, Level};

use crate::db::Schema;
use crate::error::{Result, ResultExt};
use crate::repository::{codebase, perf_data_source};

#[derive(Clone)]
pub struct PerfDataSourceService {
    pool: PgPool,
}

impl PerfDataSourceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Unlinks the data source of `type_` from the codebase. Nothing happens
    /// when the codebase is gone already.
    pub async fn delete_codebase_link(
        &self,
        schema: &Schema,
        codebase_name: &str,
        type_: &str,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let Some(codebase_id) = codebase::select_id(&mut tx, schema, codebase_name).await? else {
            event!(Level::DEBUG, codebase = %codebase_name, "Codebase is already gone.");
            return Ok(());
        };
        let deleted = perf_data_source::unlink_codebase_type(&mut tx, schema, codebase_id, type_)
            .await
            .context(|| {
                format!("couldn't unlink {type_} data source from codebase {codebase_name}")
            })?;
        tx.commit().await?;
        event!(
            Level::INFO,
            codebase = %codebase_name,
            data_source = %type_,
            deleted,
            "Perf data source has been unlinked."
        );
        Ok(())
    }
}
