use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::AvailabilityStatus;

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(group = "v2.edp.epam.com", version = "v1", kind = "PerfServer", namespaced)]
#[kube(status = "AvailabilityStatus")]
#[serde(rename_all = "camelCase")]
pub struct PerfServerSpec {
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub root_url: String,
    #[serde(default)]
    pub credential_name: String,
    #[serde(default)]
    pub project_name: String,
}

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "v2.edp.epam.com",
    version = "v1",
    kind = "PerfDataSourceJenkins",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct PerfDataSourceJenkinsSpec {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub codebase_name: String,
}

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "v2.edp.epam.com",
    version = "v1",
    kind = "PerfDataSourceSonar",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct PerfDataSourceSonarSpec {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub codebase_name: String,
}
