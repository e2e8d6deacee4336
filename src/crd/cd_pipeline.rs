use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ActionStatus;

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(group = "v2.edp.epam.com", version = "v1", kind = "CDPipeline", namespaced)]
#[kube(status = "ActionStatus")]
#[serde(rename_all = "camelCase")]
pub struct CDPipelineSpec {
    pub name: String,
    #[serde(default)]
    pub input_docker_streams: Vec<String>,
    #[serde(default)]
    pub applications_to_promote: Vec<String>,
    #[serde(default)]
    pub deployment_type: String,
}

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(group = "v2.edp.epam.com", version = "v1", kind = "Stage", namespaced)]
#[kube(status = "ActionStatus")]
#[serde(rename_all = "camelCase")]
pub struct StageSpec {
    pub name: String,
    pub cd_pipeline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub trigger_type: String,
    pub order: i32,
    #[serde(default)]
    pub quality_gates: Vec<QualityGate>,
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub job_provisioning: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QualityGate {
    pub quality_gate_type: String,
    pub step_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autotest_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct Source {
    #[serde(rename = "type", default)]
    pub type_: String,
    #[serde(default)]
    pub library: Library,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct Library {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub branch: String,
}
