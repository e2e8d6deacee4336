//! Resolution of the tenant schema a namespaced resource is mirrored into.

use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::{Api, Client, Resource, ResourceExt};

use crate::db::Schema;
use crate::error::{Error, Result};

pub const EDP_CONFIG_MAP: &str = "edp-config";
pub const EDP_NAME_KEY: &str = "edp_name";

/// Reads the EDP name of `namespace` from its `edp-config` config map.
pub async fn edp_name(client: Client, namespace: &str) -> Result<Schema> {
    let api: Api<ConfigMap> = Api::namespaced(client, namespace);
    let config_map = api.get_opt(EDP_CONFIG_MAP).await?;
    let name = config_map
        .and_then(|config_map| config_map.data)
        .and_then(|mut data| data.remove(EDP_NAME_KEY))
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| Error::MissingEdpName {
            namespace: namespace.to_owned(),
        })?;
    Schema::new(name)
}

/// Reads the EDP name of the namespace `resource` lives in.
pub async fn edp_name_of<K>(client: Client, resource: &K) -> Result<Schema>
where
    K: Resource,
{
    let namespace = resource.namespace().unwrap_or_default();
    if namespace.is_empty() {
        return Err(Error::MissingEdpName { namespace });
    }
    edp_name(client, &namespace).await
}

/// The first owner reference of the given `kind`.
pub fn owner_reference<'a>(kind: &str, refs: &'a [OwnerReference]) -> Option<&'a OwnerReference> {
    refs.iter().find(|owner| owner.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(kind: &str, name: &str) -> OwnerReference {
        OwnerReference {
            api_version: "v2.edp.epam.com/v1".to_owned(),
            kind: kind.to_owned(),
            name: name.to_owned(),
            uid: format!("{name}-uid"),
            ..Default::default()
        }
    }

    #[test]
    fn finds_owner_by_kind() {
        let refs = [owner("CDPipeline", "mypipe"), owner("Stage", "mypipe-qa")];
        assert_eq!(
            owner_reference("Stage", &refs).map(|owner| owner.name.as_str()),
            Some("mypipe-qa")
        );
        assert!(owner_reference("Codebase", &refs).is_none());
        assert!(owner_reference("Stage", &[]).is_none());
    }
}
