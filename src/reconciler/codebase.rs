use kube::{Client, ResourceExt};
use kube_runtime::controller::Action;
use sqlx::PgPool;

use super::fingerprint;
use crate::controller::Context;
use crate::crd;
use crate::error::Error;
use crate::model;
use crate::service::{CodebaseBranchService, CodebaseService};
use crate::tenant;

pub struct CodebaseReconciler {
    service: CodebaseService,
}

impl CodebaseReconciler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            service: CodebaseService::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Context for CodebaseReconciler {
    type Resource = crd::Codebase;
    type Error = Error;

    const CONTROLLER_NAME: &'static str = "codebase";
    const FINALIZER_NAME: Option<&'static str> = Some("codebase.reconciler.finalizer.name");

    fn fingerprint(&self, codebase: &crd::Codebase) -> Option<u64> {
        let status = codebase.status.as_ref();
        fingerprint(&(
            &codebase.spec,
            status.map(|status| &status.value),
            status.map(|status| &status.action),
        ))
    }

    async fn apply(
        &self,
        client: Client,
        codebase: &crd::Codebase,
    ) -> Result<Option<Action>, Error> {
        let tenant = tenant::edp_name_of(client, codebase).await?;
        let codebase = model::codebase::convert(codebase, tenant);
        self.service.put(&codebase).await?;
        Ok(None)
    }

    async fn cleanup(
        &self,
        client: Client,
        codebase: &crd::Codebase,
    ) -> Result<Option<Action>, Error> {
        let tenant = tenant::edp_name_of(client, codebase).await?;
        self.service.delete(&tenant, &codebase.name_any()).await?;
        Ok(None)
    }
}

pub struct CodebaseBranchReconciler {
    service: CodebaseBranchService,
}

impl CodebaseBranchReconciler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            service: CodebaseBranchService::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Context for CodebaseBranchReconciler {
    type Resource = crd::CodebaseBranch;
    type Error = Error;

    const CONTROLLER_NAME: &'static str = "codebase-branch";
    const FINALIZER_NAME: Option<&'static str> = Some("codebasebranch.reconciler.finalizer.name");

    fn fingerprint(&self, branch: &crd::CodebaseBranch) -> Option<u64> {
        let status = branch.status.as_ref();
        fingerprint(&(
            &branch.spec,
            status.map(|status| (&status.value, &status.action)),
            status.map(|status| (&status.build, &status.last_successful_build)),
        ))
    }

    async fn apply(
        &self,
        client: Client,
        branch: &crd::CodebaseBranch,
    ) -> Result<Option<Action>, Error> {
        let tenant = tenant::edp_name_of(client, branch).await?;
        let branch = model::codebase_branch::convert(branch, tenant);
        self.service.put(&branch).await?;
        Ok(None)
    }

    async fn cleanup(
        &self,
        client: Client,
        branch: &crd::CodebaseBranch,
    ) -> Result<Option<Action>, Error> {
        let tenant = tenant::edp_name_of(client, branch).await?;
        self.service
            .delete(&tenant, &branch.spec.codebase_name, &branch.spec.branch_name)
            .await?;
        Ok(None)
    }
}
