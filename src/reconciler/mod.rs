//! One [`Context`](crate::Context) per watched kind. Each reconciler resolves
//! the tenant of the resource, converts it into its model and hands it to the
//! matching service.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::Serialize;

mod cd_pipeline;
mod codebase;
mod component;
mod jenkins;
mod perf;
mod server;

pub use cd_pipeline::{CDPipelineReconciler, StageReconciler};
pub use codebase::{CodebaseBranchReconciler, CodebaseReconciler};
pub use component::{EDPComponentReconciler, ThirdPartyServiceReconciler};
pub use jenkins::{JenkinsJobReconciler, JenkinsSlaveReconciler, JobProvisioningReconciler};
pub use perf::{PerfDataSource, PerfDataSourceReconciler, PerfServerReconciler};
pub use server::{GitServerReconciler, JiraServerReconciler};

/// Hash of the JSON form of `value`.
pub(crate) fn fingerprint<T>(value: &T) -> Option<u64>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_vec(value).ok()?;
    let mut hasher = DefaultHasher::new();
    json.hash(&mut hasher);
    Some(hasher.finish())
}

/// Fingerprint of resources that are only handled once.
pub(crate) const CONSTANT_FINGERPRINT: Option<u64> = Some(0);
