use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ActionStatus;

/// A Jenkins instance. Only its status is read: the agents ("slaves") and job
/// provisioners it reports are registered for the tenant.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(group = "v2.edp.epam.com", version = "v1", kind = "Jenkins", namespaced)]
#[kube(status = "JenkinsStatus")]
#[serde(rename_all = "camelCase")]
pub struct JenkinsSpec {
    #[serde(default)]
    pub base_path: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JenkinsStatus {
    #[serde(default)]
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_time_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub slaves: Vec<Slave>,
    #[serde(default)]
    pub job_provisions: Vec<JobProvision>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, JsonSchema)]
pub struct Slave {
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, JsonSchema)]
pub struct JobProvision {
    pub name: String,
    pub scope: String,
}

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(group = "v2.edp.epam.com", version = "v1", kind = "JenkinsJob", namespaced)]
#[kube(status = "ActionStatus")]
#[serde(rename_all = "camelCase")]
pub struct JenkinsJobSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_name: Option<String>,
}
