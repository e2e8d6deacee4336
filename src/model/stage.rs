use kube::ResourceExt;

use super::{fill, ActionLog};
use crate::crd;
use crate::db::Schema;

const AUTOTESTS_GATE: &str = "autotests";
pub const DEFAULT_SOURCE: &str = "default";
pub const LIBRARY_SOURCE: &str = "library";

#[derive(Clone, Debug, PartialEq)]
pub struct Stage {
    pub name: String,
    pub tenant: Schema,
    pub namespace: String,
    pub cd_pipeline_name: String,
    pub description: String,
    pub trigger_type: String,
    pub order: i32,
    pub action_log: ActionLog,
    pub status: String,
    pub quality_gates: Vec<QualityGate>,
    pub source: Source,
    pub job_provisioning: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Source {
    pub type_: String,
    pub library: Library,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Library {
    pub name: String,
    pub branch: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QualityGate {
    pub quality_gate: String,
    pub jenkins_step_name: String,
    pub autotest_name: Option<String>,
    pub branch_name: Option<String>,
}

impl Source {
    pub fn is_library(&self) -> bool {
        self.type_ == LIBRARY_SOURCE
    }
}

/// Name of the image stream a stage promotes `codebase` into.
pub fn verified_stream_name(pipeline: &str, stage: &str, codebase: &str) -> String {
    format!("{pipeline}-{stage}-{codebase}-verified")
}

fn action_message(action: &str) -> Option<&'static str> {
    let template = match action {
        "accept_cd_stage_registration" => "Accept CD Stage {} registration",
        "fetching_user_settings_config_map" => {
            "Fetch User Settings from config map during CD Stage {} provision"
        }
        "platform_project_creation" => "Create Openshift Project for Stage {}",
        "jenkins_configuration" => "CI Jenkins pipelines {} provisioning",
        "setup_deployment_templates" => "Setup deployment templates for cd_stage {}",
        "create_jenkins_pipeline" => "Create Jenkins pipeline for CD Stage {}",
        _ => return None,
    };
    Some(template)
}

fn convert_quality_gates(gates: &[crd::QualityGate]) -> Vec<QualityGate> {
    gates
        .iter()
        .map(|gate| {
            let quality_gate = gate.quality_gate_type.to_lowercase();
            let autotests = quality_gate == AUTOTESTS_GATE;
            QualityGate {
                jenkins_step_name: gate.step_name.to_lowercase(),
                autotest_name: gate.autotest_name.clone().filter(|_| autotests),
                branch_name: gate.branch_name.clone().filter(|_| autotests),
                quality_gate,
            }
        })
        .collect()
}

pub fn convert(stage: &crd::Stage, tenant: Schema) -> Stage {
    let resource_name = stage.name_any();
    let spec = &stage.spec;
    let status = stage.status.clone().unwrap_or_default();
    let action_log = ActionLog::from_status(&status, |action| {
        action_message(action).map(|template| fill(template, &[&resource_name]))
    });
    let source_type = if spec.source.type_.is_empty() {
        DEFAULT_SOURCE.to_owned()
    } else {
        spec.source.type_.to_lowercase()
    };

    Stage {
        name: spec.name.clone(),
        tenant,
        namespace: stage.namespace().unwrap_or_default(),
        cd_pipeline_name: spec.cd_pipeline.clone(),
        description: spec.description.clone(),
        trigger_type: spec.trigger_type.to_lowercase(),
        order: spec.order,
        action_log,
        status: status.value,
        quality_gates: convert_quality_gates(&spec.quality_gates),
        source: Source {
            type_: source_type,
            library: Library {
                name: spec.source.library.name.clone(),
                branch: spec.source.library.branch.clone(),
            },
        },
        job_provisioning: spec.job_provisioning.clone(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::crd::{ActionStatus, StageSpec};

    fn stage(gates: Vec<crd::QualityGate>) -> crd::Stage {
        let mut k8s = crd::Stage::new(
            "fake-name",
            StageSpec {
                name: "fake-name".to_owned(),
                cd_pipeline: "fake-pipeline".to_owned(),
                description: "fake-description".to_owned(),
                trigger_type: "Manual".to_owned(),
                order: 1,
                quality_gates: gates,
                job_provisioning: "fake-job-provisioning".to_owned(),
                ..Default::default()
            },
        );
        k8s.metadata.namespace = Some("fake-namespace".to_owned());
        k8s.status = Some(ActionStatus {
            username: "fake-user".to_owned(),
            detailed_message: "fake-detailed-message".to_owned(),
            value: "active".to_owned(),
            action: "accept_cd_stage_registration".to_owned(),
            result: "success".to_owned(),
            available: true,
            last_time_updated: Some(Utc::now()),
            status: "created".to_owned(),
        });
        k8s
    }

    #[test]
    fn convert_stage() {
        let k8s = stage(vec![crd::QualityGate {
            quality_gate_type: "Autotests".to_owned(),
            step_name: "Fake-Jenkins-Step-Name".to_owned(),
            autotest_name: Some("fake-autotest".to_owned()),
            branch_name: Some("fake-branch".to_owned()),
        }]);

        let stage = convert(&k8s, Schema::new("foobar").unwrap());
        assert_eq!(stage.name, "fake-name");
        assert_eq!(stage.cd_pipeline_name, "fake-pipeline");
        assert_eq!(stage.namespace, "fake-namespace");
        assert_eq!(stage.description, "fake-description");
        assert_eq!(stage.trigger_type, "manual");
        assert_eq!(stage.order, 1);
        assert_eq!(stage.job_provisioning, "fake-job-provisioning");
        assert_eq!(stage.source.type_, DEFAULT_SOURCE);
        assert!(!stage.source.is_library());
        assert_eq!(
            stage.quality_gates,
            [QualityGate {
                quality_gate: "autotests".to_owned(),
                jenkins_step_name: "fake-jenkins-step-name".to_owned(),
                autotest_name: Some("fake-autotest".to_owned()),
                branch_name: Some("fake-branch".to_owned()),
            }]
        );
        assert_eq!(
            stage.action_log.action_message,
            "Accept CD Stage fake-name registration"
        );
    }

    #[test]
    fn manual_gates_drop_autotest_fields() {
        let k8s = stage(vec![crd::QualityGate {
            quality_gate_type: "manual".to_owned(),
            step_name: "approve".to_owned(),
            autotest_name: Some("fake-autotest".to_owned()),
            branch_name: Some("fake-branch".to_owned()),
        }]);

        let stage = convert(&k8s, Schema::new("foobar").unwrap());
        assert_eq!(stage.quality_gates[0].autotest_name, None);
        assert_eq!(stage.quality_gates[0].branch_name, None);
    }

    #[test]
    fn verified_stream() {
        assert_eq!(
            verified_stream_name("mypipe", "qa", "petclinic"),
            "mypipe-qa-petclinic-verified"
        );
    }
}
