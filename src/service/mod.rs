//! Transactional operations behind each reconciler. A service method opens a
//! single transaction and only commits when every statement succeeded;
//! returning early drops the transaction, which rolls it back.

mod cd_pipeline;
mod codebase;
mod codebase_branch;
mod component;
mod jenkins;
mod perf_data_source;
mod server;
mod stage;

pub use cd_pipeline::CDPipelineService;
pub use codebase::CodebaseService;
pub use codebase_branch::CodebaseBranchService;
pub use component::{EDPComponentService, ThirdPartyServiceService};
pub use jenkins::{JenkinsJobService, JenkinsSlaveService, JobProvisioningService};
pub use perf_data_source::PerfDataSourceService;
pub use server::{GitServerService, JiraServerService, PerfServerService};
pub use stage::StageService;
