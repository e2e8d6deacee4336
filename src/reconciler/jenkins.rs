use kube::{Api, Client, ResourceExt};
use kube_runtime::controller::Action;
use sqlx::PgPool;

use super::fingerprint;
use crate::controller::Context;
use crate::crd;
use crate::error::Error;
use crate::model;
use crate::service::{JenkinsJobService, JenkinsSlaveService, JobProvisioningService};
use crate::tenant;

fn sorted<T: Clone + Ord>(items: &[T]) -> Vec<T> {
    let mut items = items.to_vec();
    items.sort();
    items
}

fn slave_names(status: &crd::JenkinsStatus) -> Vec<&str> {
    status.slaves.iter().map(|slave| slave.name.as_str()).collect()
}

fn job_provisions(status: &crd::JenkinsStatus) -> Vec<(&str, &str)> {
    status
        .job_provisions
        .iter()
        .map(|provision| (provision.name.as_str(), provision.scope.as_str()))
        .collect()
}

/// Registers the agents a Jenkins instance reports.
pub struct JenkinsSlaveReconciler {
    service: JenkinsSlaveService,
}

impl JenkinsSlaveReconciler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            service: JenkinsSlaveService::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Context for JenkinsSlaveReconciler {
    type Resource = crd::Jenkins;
    type Error = Error;

    const CONTROLLER_NAME: &'static str = "jenkins-slave";
    const FINALIZER_NAME: Option<&'static str> = None;

    fn fingerprint(&self, jenkins: &crd::Jenkins) -> Option<u64> {
        let slaves = jenkins
            .status
            .as_ref()
            .map(|status| sorted(&status.slaves))
            .unwrap_or_default();
        fingerprint(&slaves)
    }

    async fn apply(&self, client: Client, jenkins: &crd::Jenkins) -> Result<Option<Action>, Error> {
        let Some(status) = &jenkins.status else {
            return Ok(None);
        };
        let tenant = tenant::edp_name_of(client, jenkins).await?;
        self.service.put(&tenant, slave_names(status)).await?;
        Ok(None)
    }
}

/// Registers the job provisioners a Jenkins instance reports.
pub struct JobProvisioningReconciler {
    service: JobProvisioningService,
}

impl JobProvisioningReconciler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            service: JobProvisioningService::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Context for JobProvisioningReconciler {
    type Resource = crd::Jenkins;
    type Error = Error;

    const CONTROLLER_NAME: &'static str = "job-provisioning";
    const FINALIZER_NAME: Option<&'static str> = None;

    fn fingerprint(&self, jenkins: &crd::Jenkins) -> Option<u64> {
        let provisions = jenkins
            .status
            .as_ref()
            .map(|status| sorted(&status.job_provisions))
            .unwrap_or_default();
        fingerprint(&provisions)
    }

    async fn apply(&self, client: Client, jenkins: &crd::Jenkins) -> Result<Option<Action>, Error> {
        let Some(status) = &jenkins.status else {
            return Ok(None);
        };
        let tenant = tenant::edp_name_of(client, jenkins).await?;
        self.service.put(&tenant, job_provisions(status)).await?;
        Ok(None)
    }
}

/// Records jenkins job progress in the action log of the cd pipeline that
/// owns the job's stage.
pub struct JenkinsJobReconciler {
    service: JenkinsJobService,
}

impl JenkinsJobReconciler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            service: JenkinsJobService::new(pool),
        }
    }
}

/// Name of the stage the job belongs to: its `Stage` owner, else
/// `spec.stageName`.
fn stage_name(job: &crd::JenkinsJob) -> Option<String> {
    tenant::owner_reference("Stage", job.owner_references())
        .map(|owner| owner.name.clone())
        .or_else(|| job.spec.stage_name.clone())
        .filter(|name| !name.is_empty())
}

#[async_trait::async_trait]
impl Context for JenkinsJobReconciler {
    type Resource = crd::JenkinsJob;
    type Error = Error;

    const CONTROLLER_NAME: &'static str = "jenkins-job";
    const FINALIZER_NAME: Option<&'static str> = None;

    fn fingerprint(&self, job: &crd::JenkinsJob) -> Option<u64> {
        let status = job.status.as_ref();
        fingerprint(&(
            status.map(|status| &status.action),
            status.map(|status| &status.value),
        ))
    }

    async fn apply(&self, client: Client, job: &crd::JenkinsJob) -> Result<Option<Action>, Error> {
        let stage_name = stage_name(job).ok_or_else(|| Error::MissingOwner {
            kind: "Stage",
            name: job.name_any(),
        })?;
        let namespace = job.namespace().unwrap_or_default();
        let stages: Api<crd::Stage> = Api::namespaced(client.clone(), &namespace);
        let stage = stages.get(&stage_name).await?;

        let tenant = tenant::edp_name_of(client, job).await?;
        let action_log = model::jenkins_job::action_log(job, &stage_name);
        self.service
            .put_action_log(&tenant, &stage.spec.cd_pipeline, &action_log)
            .await?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;

    use super::*;
    use crate::crd::{JenkinsJobSpec, JenkinsStatus, JobProvision, Slave};

    #[test]
    fn stage_owner_wins_over_spec() {
        let mut job = crd::JenkinsJob::new(
            "mypipe-qa-job",
            JenkinsJobSpec {
                stage_name: Some("from-spec".to_owned()),
                ..Default::default()
            },
        );
        assert_eq!(stage_name(&job).as_deref(), Some("from-spec"));

        job.metadata.owner_references = Some(vec![OwnerReference {
            api_version: "v2.edp.epam.com/v1".to_owned(),
            kind: "Stage".to_owned(),
            name: "mypipe-qa".to_owned(),
            uid: "uid".to_owned(),
            ..Default::default()
        }]);
        assert_eq!(stage_name(&job).as_deref(), Some("mypipe-qa"));
    }

    #[test]
    fn job_without_stage() {
        let job = crd::JenkinsJob::new("orphan", JenkinsJobSpec::default());
        assert_eq!(stage_name(&job), None);
    }

    #[test]
    fn status_lists() {
        let status = JenkinsStatus {
            slaves: vec![
                Slave {
                    name: "gradle".to_owned(),
                },
                Slave {
                    name: "maven".to_owned(),
                },
            ],
            job_provisions: vec![JobProvision {
                name: "default".to_owned(),
                scope: "ci".to_owned(),
            }],
            ..Default::default()
        };
        assert_eq!(slave_names(&status), ["gradle", "maven"]);
        assert_eq!(job_provisions(&status), [("default", "ci")]);
    }
}
