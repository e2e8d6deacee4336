use kube::ResourceExt;

use super::{fill, ActionLog};
use crate::crd;
use crate::db::Schema;

const IMPORT_STRATEGY: &str = "import";

pub const APPLICATION: &str = "application";

#[derive(Clone, Debug, PartialEq)]
pub struct Codebase {
    pub name: String,
    pub tenant: Schema,
    pub type_: String,
    pub language: String,
    pub framework: Option<String>,
    pub build_tool: String,
    pub strategy: String,
    pub repository_url: String,
    pub action_log: ActionLog,
    pub description: String,
    pub test_report_framework: String,
    pub status: String,
    pub git_server: String,
    pub git_url_path: Option<String>,
    pub jenkins_slave: Option<String>,
    pub job_provisioning: Option<String>,
    pub deployment_script: String,
    pub versioning_type: String,
    pub start_versioning_from: Option<String>,
    pub jira_server: Option<String>,
    pub commit_message_pattern: Option<String>,
    pub ticket_name_pattern: Option<String>,
    pub ci_tool: String,
    pub perf: Option<Perf>,
    pub default_branch: String,
    pub jira_issue_metadata_payload: Option<String>,
    pub empty_project: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Perf {
    pub name: String,
    pub data_sources: Vec<String>,
}

/// Ids of the rows a codebase row points to.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CodebaseRefs {
    pub git_server_id: i32,
    pub jira_server_id: Option<i32>,
    pub jenkins_slave_id: Option<i32>,
    pub job_provisioning_id: Option<i32>,
    pub perf_server_id: Option<i32>,
}

impl Codebase {
    /// Imported projects already live in git; everything else is created.
    pub fn project_status(&self) -> &'static str {
        if self.strategy == IMPORT_STRATEGY {
            "pushed"
        } else {
            "created"
        }
    }

    pub fn is_application(&self) -> bool {
        self.type_ == APPLICATION
    }
}

fn action_message(action: &str) -> Option<&'static str> {
    let template = match action {
        "codebase_registration" => "Codebase {} registration",
        "accept_codebase_registration" => "Accept codebase {} registration",
        "gerrit_repository_provisioning" => "Gerrit repository for codebase {} provisioning",
        "jenkins_configuration" => "CI Jenkins pipelines codebase {} provisioning",
        "perf_registration" => "Registration codebase {} in Perf",
        "setup_deployment_templates" => "Setup deployment templates for codebase {}",
        "put_s2i" => "Put s2i for {} codebase",
        "put_jenkins_folder" => "Put JenkinsFolder CR for {} codebase",
        "clean_data" => "Clean temporary data for {} codebase",
        "import_project" => "Start importing project {}",
        "put_version_file" => "Put VERSION file for Go {} app",
        "put_gitlab_ci_file" => "Put GitlabCI file for {} codebase",
        _ => return None,
    };
    Some(template)
}

pub fn convert(codebase: &crd::Codebase, tenant: Schema) -> Codebase {
    let name = codebase.name_any();
    let spec = &codebase.spec;
    let status = codebase.status.clone().unwrap_or_default();
    let action_log = ActionLog::from_status(&status, |action| {
        action_message(action).map(|template| fill(template, &[&name]))
    });
    let strategy = spec.strategy.to_lowercase();

    Codebase {
        tenant,
        type_: spec.type_.clone(),
        language: spec.lang.to_lowercase(),
        framework: spec.framework.as_deref().map(str::to_lowercase),
        build_tool: spec.build_tool.to_lowercase(),
        repository_url: spec
            .repository
            .as_ref()
            .map(|repository| repository.url.clone())
            .unwrap_or_default(),
        action_log,
        description: spec.description.clone().unwrap_or_default(),
        test_report_framework: spec.test_report_framework.clone().unwrap_or_default(),
        status: status.value,
        git_server: spec.git_server.clone(),
        git_url_path: if strategy == IMPORT_STRATEGY {
            spec.git_url_path.clone()
        } else {
            None
        },
        jenkins_slave: spec.jenkins_slave.clone(),
        job_provisioning: spec.job_provisioning.clone(),
        deployment_script: spec.deployment_script.clone(),
        versioning_type: spec.versioning.type_.clone(),
        start_versioning_from: spec.versioning.start_from.clone(),
        jira_server: spec.jira_server.clone(),
        commit_message_pattern: spec.commit_message_pattern.clone(),
        ticket_name_pattern: spec.ticket_name_pattern.clone(),
        ci_tool: spec.ci_tool.clone(),
        perf: spec.perf.as_ref().map(|perf| Perf {
            name: perf.name.clone(),
            data_sources: perf.data_sources.clone(),
        }),
        default_branch: spec.default_branch.clone(),
        jira_issue_metadata_payload: spec.jira_issue_metadata_payload.clone(),
        empty_project: spec.empty_project,
        strategy,
        name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{ActionStatus, CodebaseSpec, Repository};

    fn codebase(strategy: &str) -> crd::Codebase {
        let mut codebase = crd::Codebase::new(
            "petclinic",
            CodebaseSpec {
                lang: "Java".to_owned(),
                framework: Some("SpringBoot".to_owned()),
                build_tool: "Maven".to_owned(),
                strategy: strategy.to_owned(),
                repository: Some(Repository {
                    url: "https://github.com/spring-projects/spring-petclinic.git".to_owned(),
                }),
                type_: APPLICATION.to_owned(),
                git_server: "gerrit".to_owned(),
                git_url_path: Some("/petclinic".to_owned()),
                ..Default::default()
            },
        );
        codebase.status = Some(ActionStatus {
            status: "created".to_owned(),
            action: "codebase_registration".to_owned(),
            result: "success".to_owned(),
            value: "inactive".to_owned(),
            ..Default::default()
        });
        codebase
    }

    #[test]
    fn convert_clone_strategy() {
        let tenant = Schema::new("foobar").unwrap();
        let c = convert(&codebase("Clone"), tenant.clone());

        assert_eq!(c.name, "petclinic");
        assert_eq!(c.tenant, tenant);
        assert_eq!(c.language, "java");
        assert_eq!(c.framework.as_deref(), Some("springboot"));
        assert_eq!(c.build_tool, "maven");
        assert_eq!(c.strategy, "clone");
        assert_eq!(
            c.repository_url,
            "https://github.com/spring-projects/spring-petclinic.git"
        );
        assert_eq!(c.git_url_path, None);
        assert_eq!(c.status, "inactive");
        assert_eq!(c.project_status(), "created");
        assert!(c.is_application());
        assert_eq!(c.action_log.action_message, "Codebase petclinic registration");
    }

    #[test]
    fn convert_import_strategy_keeps_git_path() {
        let c = convert(&codebase("import"), Schema::new("foobar").unwrap());
        assert_eq!(c.git_url_path.as_deref(), Some("/petclinic"));
        assert_eq!(c.project_status(), "pushed");
    }

    #[test]
    fn convert_without_status() {
        let mut k8s = codebase("clone");
        k8s.status = None;
        k8s.spec.repository = None;
        let c = convert(&k8s, Schema::new("foobar").unwrap());
        assert_eq!(c.status, "");
        assert_eq!(c.repository_url, "");
        assert_eq!(c.action_log.action_message, "");
    }
}
