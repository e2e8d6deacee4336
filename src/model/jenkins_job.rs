use super::{fill, ActionLog};
use crate::crd;

fn action_message(action: &str) -> Option<&'static str> {
    let template = match action {
        "platform_project_creation" => "Create Platform Project for Stage {}",
        "role_binding" => "Create Role Binding for project stage {}",
        "create_jenkins_pipeline" => "Create Jenkins pipeline for CD Stage {}",
        _ => return None,
    };
    Some(template)
}

/// Action log entry recorded against the CD pipeline that owns `stage`.
/// Jenkins jobs report no event.
pub fn action_log(job: &crd::JenkinsJob, stage: &str) -> ActionLog {
    let status = job.status.clone().unwrap_or_default();
    ActionLog {
        event: String::new(),
        ..ActionLog::from_status(&status, |action| {
            action_message(action).map(|template| fill(template, &[stage]))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::{ActionStatus, JenkinsJobSpec};

    #[test]
    fn message_names_the_stage() {
        let mut job = crd::JenkinsJob::new("mypipe-qa", JenkinsJobSpec::default());
        job.status = Some(ActionStatus {
            action: "role_binding".to_owned(),
            result: "success".to_owned(),
            ..Default::default()
        });
        assert_eq!(
            action_log(&job, "mypipe-qa").action_message,
            "Create Role Binding for project stage mypipe-qa"
        );
    }

    #[test]
    fn event_is_left_empty() {
        let mut job = crd::JenkinsJob::new("mypipe-qa", JenkinsJobSpec::default());
        job.status = Some(ActionStatus {
            status: "In progress".to_owned(),
            action: "create_jenkins_pipeline".to_owned(),
            result: "success".to_owned(),
            ..Default::default()
        });
        let log = action_log(&job, "mypipe-qa");
        assert_eq!(log.event, "");
        assert_eq!(log.action, "create_jenkins_pipeline");
    }
}
