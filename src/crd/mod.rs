//! Custom resources watched by the reconciler. The types only carry the fields
//! that end up in the tenant schema; unknown fields are ignored.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod cd_pipeline;
mod codebase;
mod component;
mod jenkins;
mod perf;

pub use cd_pipeline::*;
pub use codebase::*;
pub use component::*;
pub use jenkins::*;
pub use perf::*;

/// Status shared by the resources whose progress is recorded in `action_log`.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionStatus {
    #[serde(default)]
    pub available: bool,
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
}

/// Status of resources that only report whether the remote system is reachable.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityStatus {
    #[serde(default)]
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_time_updated: Option<DateTime<Utc>>,
}
