use std::marker::PhantomData;

use kube::core::NamespaceResourceScope;
use kube::{Client, Resource, ResourceExt};
use kube_runtime::controller::Action;
use sqlx::PgPool;

use super::{fingerprint, CONSTANT_FINGERPRINT};
use crate::controller::Context;
use crate::crd;
use crate::error::Error;
use crate::model;
use crate::service::{PerfDataSourceService, PerfServerService};
use crate::tenant;

pub struct PerfServerReconciler {
    service: PerfServerService,
}

impl PerfServerReconciler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            service: PerfServerService::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Context for PerfServerReconciler {
    type Resource = crd::PerfServer;
    type Error = Error;

    const CONTROLLER_NAME: &'static str = "perf-server";
    const FINALIZER_NAME: Option<&'static str> = None;

    fn fingerprint(&self, server: &crd::PerfServer) -> Option<u64> {
        let available = server.status.as_ref().map(|status| status.available);
        fingerprint(&(&server.spec, available))
    }

    async fn apply(
        &self,
        client: Client,
        server: &crd::PerfServer,
    ) -> Result<Option<Action>, Error> {
        let tenant = tenant::edp_name_of(client, server).await?;
        let server = model::server::convert_perf(server, tenant);
        self.service.put(&server).await?;
        Ok(None)
    }
}

/// A perf data source resource owned by a codebase.
pub trait PerfDataSource: Resource<Scope = NamespaceResourceScope> {
    const CONTROLLER_NAME: &'static str;
    const FINALIZER_NAME: &'static str;

    /// The `perf_data_source.type` this resource stands for.
    fn data_source_type(&self) -> &str;
}

impl PerfDataSource for crd::PerfDataSourceJenkins {
    const CONTROLLER_NAME: &'static str = "perf-data-source-jenkins";
    const FINALIZER_NAME: &'static str = "jenkins.data.source.reconciler.finalizer.name";

    fn data_source_type(&self) -> &str {
        &self.spec.type_
    }
}

impl PerfDataSource for crd::PerfDataSourceSonar {
    const CONTROLLER_NAME: &'static str = "perf-data-source-sonar";
    const FINALIZER_NAME: &'static str = "sonar.data.source.reconciler.finalizer.name";

    fn data_source_type(&self) -> &str {
        &self.spec.type_
    }
}

/// Only deletion matters for perf data sources: the link between the owning
/// codebase and the data source is dropped before the finalizer is removed.
pub struct PerfDataSourceReconciler<K> {
    service: PerfDataSourceService,
    kind: PhantomData<fn() -> K>,
}

impl<K> PerfDataSourceReconciler<K> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            service: PerfDataSourceService::new(pool),
            kind: PhantomData,
        }
    }
}

#[async_trait::async_trait]
impl<K> Context for PerfDataSourceReconciler<K>
where
    K: PerfDataSource + Send + Sync + 'static,
{
    type Resource = K;
    type Error = Error;

    const CONTROLLER_NAME: &'static str = K::CONTROLLER_NAME;
    const FINALIZER_NAME: Option<&'static str> = Some(K::FINALIZER_NAME);

    fn fingerprint(&self, _: &K) -> Option<u64> {
        CONSTANT_FINGERPRINT
    }

    async fn apply(&self, _: Client, _: &K) -> Result<Option<Action>, Error> {
        Ok(Some(Action::await_change()))
    }

    async fn cleanup(&self, client: Client, data_source: &K) -> Result<Option<Action>, Error> {
        let name = data_source.name_any();
        let owner = tenant::owner_reference("Codebase", data_source.owner_references())
            .ok_or_else(|| Error::MissingOwner {
                kind: "Codebase",
                name: name.clone(),
            })?;
        let tenant = tenant::edp_name_of(client, data_source).await?;
        self.service
            .delete_codebase_link(&tenant, &owner.name, data_source.data_source_type())
            .await?;
        Ok(None)
    }
}
