use kube::ResourceExt;

use super::ActionLog;
use crate::crd;
use crate::db::Schema;

#[derive(Clone, Debug, PartialEq)]
pub struct GitServer {
    pub name: String,
    pub tenant: Schema,
    pub git_host: String,
    pub git_user: String,
    pub https_port: i32,
    pub ssh_port: i32,
    pub private_ssh_key: String,
    pub create_code_review_pipeline: bool,
    pub available: bool,
    pub action_log: ActionLog,
}

pub fn convert(server: &crd::GitServer, tenant: Schema) -> GitServer {
    let spec = &server.spec;
    let status = server.status.clone().unwrap_or_default();
    let action_log = ActionLog::from_status(&status, |_| None);

    GitServer {
        name: server.name_any(),
        tenant,
        git_host: spec.git_host.clone(),
        git_user: spec.git_user.clone(),
        https_port: spec.https_port,
        ssh_port: spec.ssh_port,
        private_ssh_key: spec.name_ssh_key_secret.clone(),
        create_code_review_pipeline: spec.create_code_review_pipeline,
        available: status.available,
        action_log,
    }
}
