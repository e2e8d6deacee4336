use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{ActionStatus, AvailabilityStatus};

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(group = "v2.edp.epam.com", version = "v1", kind = "Codebase", namespaced)]
#[kube(status = "ActionStatus", shortname = "cb")]
#[serde(rename_all = "camelCase")]
pub struct CodebaseSpec {
    pub lang: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    pub build_tool: String,
    pub strategy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<Repository>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_report_framework: Option<String>,
    #[serde(rename = "type")]
    pub type_: String,
    pub git_server: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_url_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jenkins_slave: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_provisioning: Option<String>,
    #[serde(default)]
    pub deployment_script: String,
    #[serde(default)]
    pub versioning: Versioning,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_name_pattern: Option<String>,
    #[serde(default)]
    pub ci_tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perf: Option<Perf>,
    #[serde(default)]
    pub default_branch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_issue_metadata_payload: Option<String>,
    #[serde(default)]
    pub empty_project: bool,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
pub struct Repository {
    pub url: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Versioning {
    #[serde(rename = "type", default)]
    pub type_: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_from: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Perf {
    pub name: String,
    #[serde(default)]
    pub data_sources: Vec<String>,
}

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(group = "v2.edp.epam.com", version = "v1", kind = "CodebaseBranch", namespaced)]
#[kube(status = "CodebaseBranchStatus", shortname = "cbr")]
#[serde(rename_all = "camelCase")]
pub struct CodebaseBranchSpec {
    pub codebase_name: String,
    pub branch_name: String,
    #[serde(default)]
    pub from_commit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub release: bool,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodebaseBranchStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_time_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub detailed_message: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_successful_build: Option<String>,
}

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(group = "v2.edp.epam.com", version = "v1", kind = "GitServer", namespaced)]
#[kube(status = "ActionStatus")]
#[serde(rename_all = "camelCase")]
pub struct GitServerSpec {
    pub git_host: String,
    pub git_user: String,
    pub https_port: i32,
    pub ssh_port: i32,
    pub name_ssh_key_secret: String,
    #[serde(default)]
    pub create_code_review_pipeline: bool,
}

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(group = "v2.edp.epam.com", version = "v1", kind = "JiraServer", namespaced)]
#[kube(status = "AvailabilityStatus")]
#[serde(rename_all = "camelCase")]
pub struct JiraServerSpec {
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub root_url: String,
    #[serde(default)]
    pub credential_name: String,
}

/// A service outside of EDP registered for a tenant.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(group = "v2.edp.epam.com", version = "v1", kind = "Service", namespaced)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub icon: String,
}

/// `Service` clashes with the core kind in most contexts.
pub type ThirdPartyService = Service;
