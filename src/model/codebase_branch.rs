use super::{fill, ActionLog};
use crate::crd::{self, ActionStatus};
use crate::db::Schema;

#[derive(Clone, Debug, PartialEq)]
pub struct CodebaseBranch {
    pub name: String,
    pub tenant: Schema,
    pub app_name: String,
    pub from_commit: String,
    pub version: Option<String>,
    pub build_number: Option<String>,
    pub last_success_build: Option<String>,
    pub release: bool,
    pub status: String,
    pub action_log: ActionLog,
}

impl CodebaseBranch {
    /// Name of the image stream built from this branch.
    pub fn docker_stream_name(&self) -> String {
        docker_stream_name(&self.app_name, &self.name)
    }
}

pub fn docker_stream_name(codebase: &str, branch: &str) -> String {
    format!("{codebase}-{}", branch.replace('/', "-"))
}

fn action_message(action: &str) -> Option<&'static str> {
    let template = match action {
        "jenkins_configuration" => {
            "CI Jenkins pipelines for codebase branch {} provisioning for codebase {}"
        }
        "codebase_branch_registration" => "Branch {} for codebase {} registration",
        "accept_codebase_branch_registration" => "Accept branch {} for codebase {} registration",
        "put_branch_for_gitlab_ci_codebase" => "Create {} branch for {} codebase in Git ",
        "trigger_release_job" => "Trigger release job. Branch - {}, Codebase - {}",
        "put_codebase_image_stream" => "Put Codebase ImageStream. Branch - {}, Codebase - {}",
        "perf_data_source_cr_update" => "Update PerfDataSource CR. Branch - {}, Codebase - {}",
        _ => return None,
    };
    Some(template)
}

pub fn convert(branch: &crd::CodebaseBranch, tenant: Schema) -> CodebaseBranch {
    let spec = &branch.spec;
    let status = branch.status.clone().unwrap_or_default();
    let action_status = ActionStatus {
        available: false,
        last_time_updated: status.last_time_updated,
        status: status.status,
        username: status.username,
        action: status.action,
        result: status.result,
        detailed_message: status.detailed_message,
        value: status.value.clone(),
    };
    let action_log = ActionLog::from_status(&action_status, |action| {
        action_message(action)
            .map(|template| fill(template, &[&spec.branch_name, &spec.codebase_name]))
    });

    CodebaseBranch {
        name: spec.branch_name.clone(),
        tenant,
        app_name: spec.codebase_name.clone(),
        from_commit: spec.from_commit.clone(),
        version: spec.version.clone(),
        build_number: status.build,
        last_success_build: status.last_successful_build,
        release: spec.release,
        status: status.value,
        action_log,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{CodebaseBranchSpec, CodebaseBranchStatus};

    #[test]
    fn convert_branch() {
        let mut k8s = crd::CodebaseBranch::new(
            "petclinic-release-1-0",
            CodebaseBranchSpec {
                codebase_name: "petclinic".to_owned(),
                branch_name: "release/1.0".to_owned(),
                from_commit: "a1b2c3".to_owned(),
                version: Some("1.0.0-SNAPSHOT".to_owned()),
                release: true,
            },
        );
        k8s.status = Some(CodebaseBranchStatus {
            status: "created".to_owned(),
            action: "codebase_branch_registration".to_owned(),
            result: "success".to_owned(),
            value: "active".to_owned(),
            build: Some("3".to_owned()),
            last_successful_build: Some("2".to_owned()),
            ..Default::default()
        });

        let branch = convert(&k8s, Schema::new("foobar").unwrap());
        assert_eq!(branch.name, "release/1.0");
        assert_eq!(branch.app_name, "petclinic");
        assert_eq!(branch.build_number.as_deref(), Some("3"));
        assert_eq!(branch.last_success_build.as_deref(), Some("2"));
        assert!(branch.release);
        assert_eq!(branch.status, "active");
        assert_eq!(
            branch.action_log.action_message,
            "Branch release/1.0 for codebase petclinic registration"
        );
        assert_eq!(branch.docker_stream_name(), "petclinic-release-1.0");
    }
}
