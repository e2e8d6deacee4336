use kube::ResourceExt;

use super::{fill, ActionLog};
use crate::crd;
use crate::db::Schema;

#[derive(Clone, Debug, PartialEq)]
pub struct CDPipeline {
    pub name: String,
    pub namespace: String,
    pub tenant: Schema,
    pub input_docker_streams: Vec<String>,
    pub applications_to_promote: Vec<String>,
    pub deployment_type: String,
    pub status: String,
    pub action_log: ActionLog,
}

fn action_message(action: &str) -> Option<&'static str> {
    let template = match action {
        "accept_cd_pipeline_registration" => "Accept CD Pipeline {} registration",
        "jenkins_configuration" => "CI Jenkins pipelines {} provisioning",
        "setup_initial_structure" => "Initial structure for CD Pipeline {} is created",
        "cd_pipeline_registration" => "CD Pipeline {} registration",
        "create_jenkins_directory" => "Create directory in Jenkins for CD Pipeline {}",
        _ => return None,
    };
    Some(template)
}

pub fn convert(pipeline: &crd::CDPipeline, tenant: Schema) -> CDPipeline {
    let resource_name = pipeline.name_any();
    let spec = &pipeline.spec;
    let status = pipeline.status.clone().unwrap_or_default();
    let action_log = ActionLog::from_status(&status, |action| {
        action_message(action).map(|template| fill(template, &[&resource_name]))
    });

    CDPipeline {
        name: spec.name.clone(),
        namespace: pipeline.namespace().unwrap_or_default(),
        tenant,
        input_docker_streams: spec.input_docker_streams.clone(),
        applications_to_promote: spec.applications_to_promote.clone(),
        deployment_type: spec.deployment_type.clone(),
        status: status.value,
        action_log,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::crd::{ActionStatus, CDPipelineSpec};

    #[test]
    fn convert_pipeline() {
        let now = Utc::now();
        let mut k8s = crd::CDPipeline::new(
            "fake-name",
            CDPipelineSpec {
                name: "fake-name".to_owned(),
                input_docker_streams: vec!["fake-docker-stream-verified".to_owned()],
                applications_to_promote: vec!["fake-application".to_owned()],
                deployment_type: "container".to_owned(),
            },
        );
        k8s.metadata.namespace = Some("fake-namespace".to_owned());
        k8s.status = Some(ActionStatus {
            username: "fake-user".to_owned(),
            detailed_message: "fake-detailed-message".to_owned(),
            value: "active".to_owned(),
            action: "setup_initial_structure".to_owned(),
            result: "success".to_owned(),
            available: true,
            last_time_updated: Some(now),
            status: "created".to_owned(),
        });

        let pipeline = convert(&k8s, Schema::new("foobar").unwrap());
        assert_eq!(pipeline.name, "fake-name");
        assert_eq!(pipeline.namespace, "fake-namespace");
        assert_eq!(pipeline.input_docker_streams, ["fake-docker-stream-verified"]);
        assert_eq!(pipeline.applications_to_promote, ["fake-application"]);
        assert_eq!(pipeline.status, "active");
        assert_eq!(pipeline.action_log.event, "created");
        assert_eq!(pipeline.action_log.updated_at, Some(now));
        assert_eq!(pipeline.action_log.username, "fake-user");
        assert_eq!(
            pipeline.action_log.action_message,
            "Initial structure for CD Pipeline fake-name is created"
        );
    }

    #[test]
    fn convert_failed_pipeline() {
        let mut k8s = crd::CDPipeline::new("fake-name", CDPipelineSpec::default());
        k8s.status = Some(ActionStatus {
            detailed_message: "jenkins is unreachable".to_owned(),
            action: "jenkins_configuration".to_owned(),
            result: "error".to_owned(),
            ..Default::default()
        });

        let pipeline = convert(&k8s, Schema::new("foobar").unwrap());
        assert_eq!(pipeline.action_log.action_message, "jenkins is unreachable");
        assert_eq!(pipeline.action_log.result, "error");
    }
}
