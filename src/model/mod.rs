//! Plain data-transfer objects converted from the custom resources. Services
//! only ever see these, never the Kubernetes types.

use chrono::{DateTime, Utc};

use crate::crd::ActionStatus;

pub mod cd_pipeline;
pub mod codebase;
pub mod codebase_branch;
pub mod edp_component;
pub mod git_server;
pub mod jenkins_job;
pub mod server;
pub mod stage;
pub mod third_party_service;

const ERROR_RESULT: &str = "error";

/// One row of the tenant's `action_log` table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionLog {
    pub event: String,
    pub detailed_message: String,
    pub username: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub action: String,
    pub result: String,
    pub action_message: String,
}

impl ActionLog {
    /// Builds the log entry for `status`. Failed actions keep the detailed
    /// message as their action message; otherwise `message` renders the
    /// human readable text for the action (empty for unknown actions).
    pub fn from_status<F>(status: &ActionStatus, message: F) -> Self
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let action_message = if status.result == ERROR_RESULT {
            status.detailed_message.clone()
        } else {
            message(&status.action).unwrap_or_default()
        };

        Self {
            event: format_status(&status.status),
            detailed_message: status.detailed_message.clone(),
            username: status.username.clone(),
            updated_at: status.last_time_updated,
            action: status.action.clone(),
            result: status.result.clone(),
            action_message,
        }
    }
}

/// Normalizes a status reported by an operator into an `action_log` event.
pub fn format_status(status: &str) -> String {
    status.trim().to_lowercase().replace(' ', "_")
}

/// Substitutes `{}` placeholders in `template` with `args`, in order.
pub(crate) fn fill(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;
    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        out.push_str(args.next().copied().unwrap_or_default());
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}
