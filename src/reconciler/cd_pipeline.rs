use kube::Client;
use kube_runtime::controller::Action;
use sqlx::PgPool;

use super::fingerprint;
use crate::controller::Context;
use crate::crd;
use crate::error::Error;
use crate::model;
use crate::service::{CDPipelineService, StageService};
use crate::tenant;

fn action_fingerprint<S>(spec: &S, status: Option<&crd::ActionStatus>) -> Option<u64>
where
    S: serde::Serialize,
{
    fingerprint(&(
        spec,
        status.map(|status| &status.value),
        status.map(|status| &status.action),
    ))
}

pub struct CDPipelineReconciler {
    service: CDPipelineService,
}

impl CDPipelineReconciler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            service: CDPipelineService::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Context for CDPipelineReconciler {
    type Resource = crd::CDPipeline;
    type Error = Error;

    const CONTROLLER_NAME: &'static str = "cd-pipeline";
    const FINALIZER_NAME: Option<&'static str> = Some("cdpipeline.reconciler.finalizer.name");

    fn fingerprint(&self, pipeline: &crd::CDPipeline) -> Option<u64> {
        action_fingerprint(&pipeline.spec, pipeline.status.as_ref())
    }

    async fn apply(
        &self,
        client: Client,
        pipeline: &crd::CDPipeline,
    ) -> Result<Option<Action>, Error> {
        let tenant = tenant::edp_name_of(client, pipeline).await?;
        let pipeline = model::cd_pipeline::convert(pipeline, tenant);
        self.service.put(&pipeline).await?;
        Ok(None)
    }

    async fn cleanup(
        &self,
        client: Client,
        pipeline: &crd::CDPipeline,
    ) -> Result<Option<Action>, Error> {
        let tenant = tenant::edp_name_of(client, pipeline).await?;
        self.service.delete(&tenant, &pipeline.spec.name).await?;
        Ok(None)
    }
}

pub struct StageReconciler {
    service: StageService,
}

impl StageReconciler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            service: StageService::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Context for StageReconciler {
    type Resource = crd::Stage;
    type Error = Error;

    const CONTROLLER_NAME: &'static str = "stage";
    const FINALIZER_NAME: Option<&'static str> = Some("stage.reconciler.finalizer.name");

    fn fingerprint(&self, stage: &crd::Stage) -> Option<u64> {
        action_fingerprint(&stage.spec, stage.status.as_ref())
    }

    async fn apply(&self, client: Client, stage: &crd::Stage) -> Result<Option<Action>, Error> {
        let tenant = tenant::edp_name_of(client, stage).await?;
        let stage = model::stage::convert(stage, tenant);
        self.service.put(&stage).await?;
        Ok(None)
    }

    async fn cleanup(&self, client: Client, stage: &crd::Stage) -> Result<Option<Action>, Error> {
        let tenant = tenant::edp_name_of(client, stage).await?;
        self.service
            .delete(&tenant, &stage.spec.cd_pipeline, &stage.spec.name)
            .await?;
        Ok(None)
    }
}
