//! Dependent job runs: the immutable specs the orchestrator submits and the
//! instances it observes on the execution platform.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Annotation carrying the fingerprint of the spec a run was created from.
pub const SPEC_HASH_ANNOTATION: &str = "sbomer.jboss.org/spec-hash";

/// Named input passed to the task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobParam {
    pub name: String,
    pub value: String,
}

impl JobParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Shared volume mounted into the run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceBinding {
    pub name: String,
    pub claim_name: String,
    pub sub_path: String,
}

/// Desired job run. Never mutated once submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRunSpec {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    /// Ordered parameter list
    pub params: Vec<JobParam>,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    pub service_account: String,
    pub task_ref: String,
    pub workspace: WorkspaceBinding,
}

impl JobRunSpec {
    /// Value of a parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Fingerprint recorded at creation, if any.
    #[must_use]
    pub fn spec_hash(&self) -> Option<&str> {
        self.annotations.get(SPEC_HASH_ANNOTATION).map(String::as_str)
    }
}

/// Execution state reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum JobRunState {
    Pending,
    Running,
    Succeeded,
    Failed {
        #[serde(default, rename = "exitCode", skip_serializing_if = "Option::is_none")]
        exit_code: Option<i32>,
        #[serde(default)]
        message: String,
    },
    /// The platform itself enforced the timeout
    TimedOut,
}

impl JobRunState {
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed { .. } | Self::TimedOut
        )
    }
}

/// A job run as observed on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedJobRun {
    pub name: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(flatten)]
    pub state: JobRunState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl ObservedJobRun {
    /// What the platform reports right after creating `spec`.
    #[must_use]
    pub fn from_spec(spec: &JobRunSpec) -> Self {
        Self {
            name: spec.name.clone(),
            labels: spec.labels.clone(),
            annotations: spec.annotations.clone(),
            state: JobRunState::Pending,
            started_at: None,
            timeout: spec.timeout,
        }
    }

    /// Whether the run has been executing for longer than its ceiling at `now`.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        if self.state.is_finished() {
            return false;
        }
        let Some(started) = self.started_at else {
            return false;
        };
        chrono::Duration::from_std(self.timeout)
            .map(|limit| now - started > limit)
            .unwrap_or(false)
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}
