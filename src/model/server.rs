//! Integrations that are mirrored as a bare `(name, available)` pair.

use kube::{Resource, ResourceExt};

use crate::crd::{self, AvailabilityStatus};
use crate::db::Schema;

#[derive(Clone, Debug, PartialEq)]
pub struct Server {
    pub name: String,
    pub available: bool,
    pub tenant: Schema,
}

fn convert<K>(server: &K, status: Option<&AvailabilityStatus>, tenant: Schema) -> Server
where
    K: Resource,
{
    Server {
        name: server.name_any(),
        available: status.map_or(false, |status| status.available),
        tenant,
    }
}

pub fn convert_jira(server: &crd::JiraServer, tenant: Schema) -> Server {
    convert(server, server.status.as_ref(), tenant)
}

pub fn convert_perf(server: &crd::PerfServer, tenant: Schema) -> Server {
    convert(server, server.status.as_ref(), tenant)
}
