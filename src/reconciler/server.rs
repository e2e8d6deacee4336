use kube::Client;
use kube_runtime::controller::Action;
use sqlx::PgPool;

use super::fingerprint;
use crate::controller::Context;
use crate::crd;
use crate::error::Error;
use crate::model;
use crate::service::{GitServerService, JiraServerService};
use crate::tenant;

pub struct GitServerReconciler {
    service: GitServerService,
}

impl GitServerReconciler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            service: GitServerService::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Context for GitServerReconciler {
    type Resource = crd::GitServer;
    type Error = Error;

    const CONTROLLER_NAME: &'static str = "git-server";
    const FINALIZER_NAME: Option<&'static str> = None;

    fn fingerprint(&self, server: &crd::GitServer) -> Option<u64> {
        fingerprint(&(&server.spec, &server.status))
    }

    async fn apply(
        &self,
        client: Client,
        server: &crd::GitServer,
    ) -> Result<Option<Action>, Error> {
        let tenant = tenant::edp_name_of(client, server).await?;
        let server = model::git_server::convert(server, tenant);
        // The schema shows up once the tenant is provisioned; retry until then.
        self.service
            .put(&server)
            .await?
            .ok_or_else(|| Error::not_found("tenant schema", server.tenant.name()))?;
        Ok(None)
    }
}

pub struct JiraServerReconciler {
    service: JiraServerService,
}

impl JiraServerReconciler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            service: JiraServerService::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Context for JiraServerReconciler {
    type Resource = crd::JiraServer;
    type Error = Error;

    const CONTROLLER_NAME: &'static str = "jira-server";
    const FINALIZER_NAME: Option<&'static str> = None;

    fn fingerprint(&self, server: &crd::JiraServer) -> Option<u64> {
        let available = server.status.as_ref().map(|status| status.available);
        fingerprint(&(&server.spec, available))
    }

    async fn apply(
        &self,
        client: Client,
        server: &crd::JiraServer,
    ) -> Result<Option<Action>, Error> {
        let tenant = tenant::edp_name_of(client, server).await?;
        let server = model::server::convert_jira(server, tenant);
        self.service.put(&server).await?;
        Ok(None)
    }
}
