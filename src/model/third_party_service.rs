use kube::ResourceExt;

use crate::crd;
use crate::db::Schema;

#[derive(Clone, Debug, PartialEq)]
pub struct ThirdPartyService {
    pub name: String,
    pub description: String,
    pub version: String,
    pub url: String,
    pub icon: String,
    pub tenant: Schema,
}

pub fn convert(service: &crd::ThirdPartyService, tenant: Schema) -> ThirdPartyService {
    let spec = &service.spec;
    ThirdPartyService {
        name: service.name_any(),
        description: spec.description.clone(),
        version: spec.version.clone(),
        url: spec.url.clone(),
        icon: spec.icon.clone(),
        tenant,
    }
}
