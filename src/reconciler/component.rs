use kube::Client;
use kube_runtime::controller::Action;
use sqlx::PgPool;

use super::{fingerprint, CONSTANT_FINGERPRINT};
use crate::controller::Context;
use crate::crd;
use crate::error::Error;
use crate::model;
use crate::service::{EDPComponentService, ThirdPartyServiceService};
use crate::tenant;

pub struct EDPComponentReconciler {
    service: EDPComponentService,
}

impl EDPComponentReconciler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            service: EDPComponentService::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Context for EDPComponentReconciler {
    type Resource = crd::EDPComponent;
    type Error = Error;

    const CONTROLLER_NAME: &'static str = "edp-component";
    const FINALIZER_NAME: Option<&'static str> = None;

    fn fingerprint(&self, component: &crd::EDPComponent) -> Option<u64> {
        fingerprint(&component.spec)
    }

    async fn apply(
        &self,
        client: Client,
        component: &crd::EDPComponent,
    ) -> Result<Option<Action>, Error> {
        let tenant = tenant::edp_name_of(client, component).await?;
        let component = model::edp_component::convert(component);
        self.service.put(&tenant, &component).await?;
        Ok(None)
    }
}

/// Third party services are registered once and never updated.
pub struct ThirdPartyServiceReconciler {
    service: ThirdPartyServiceService,
}

impl ThirdPartyServiceReconciler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            service: ThirdPartyServiceService::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Context for ThirdPartyServiceReconciler {
    type Resource = crd::ThirdPartyService;
    type Error = Error;

    const CONTROLLER_NAME: &'static str = "third-party-service";
    const FINALIZER_NAME: Option<&'static str> = None;

    fn fingerprint(&self, _: &crd::ThirdPartyService) -> Option<u64> {
        CONSTANT_FINGERPRINT
    }

    async fn apply(
        &self,
        client: Client,
        service: &crd::ThirdPartyService,
    ) -> Result<Option<Action>, Error> {
        let tenant = tenant::edp_name_of(client, service).await?;
        let service = model::third_party_service::convert(service, tenant);
        self.service.put(&service).await?;
        Ok(None)
    }
}
