//! Dependent job-run materialization.
//!
//! Maps `(configuration, index, request)` to the job run that should exist
//! for it. Specs are a pure function of their inputs: the same request always
//! yields byte-identical specs, so diffing desired against observed runs never
//! produces spurious work.
//!
//! Names follow `{request}-{phase ordinal}-{phase}-{index}`; the trailing
//! index is recovered from observed runs with [`index_from_name`].

mod build;
mod operation;

pub use build::{BuildGenerateResource, PARAM_CONFIG, PARAM_INDEX};
pub use operation::{OperationGenerateResource, PARAM_DELIVERABLE_INDEX, PARAM_OPERATION_CONFIG};

use crate::config::OrchestratorConfig;
use crate::error::{Result, SbomGenError};
use crate::model::{
    labels, GenerationPhase, GenerationRequest, GenerationType, JobParam, JobRunSpec,
    ObservedJobRun, RequestConfig, WorkspaceBinding, SPEC_HASH_ANNOTATION,
};
use crate::utils::fingerprint_hex;
use std::collections::BTreeMap;

/// Name prefix shared by every job run of `phase` for a request.
#[must_use]
pub fn dependent_resource_name(request_name: &str, phase: GenerationPhase) -> String {
    format!("{request_name}-{}-{}", phase.ordinal(), phase.as_str())
}

/// Full job-run name for one index.
#[must_use]
pub fn resource_name(request_name: &str, phase: GenerationPhase, index: u32) -> String {
    format!("{}-{index}", dependent_resource_name(request_name, phase))
}

/// Index encoded in the trailing segment of a job-run name.
#[must_use]
pub fn index_from_name(name: &str) -> Option<u32> {
    name.rsplit_once('-')
        .and_then(|(_, suffix)| suffix.parse().ok())
}

/// Job-run family that generates requests of `kind`.
#[must_use]
pub fn for_type(kind: GenerationType) -> &'static dyn DependentResource {
    match kind {
        GenerationType::Operation => &OperationGenerateResource,
        GenerationType::Build => &BuildGenerateResource,
    }
}

/// A family of job runs derived from a generation request.
pub trait DependentResource: Send + Sync {
    /// Phase the job runs belong to.
    fn phase(&self) -> GenerationPhase;

    /// Desired spec for one index of `config`.
    fn desired(
        &self,
        config: &RequestConfig,
        index: u32,
        request: &GenerationRequest,
        settings: &OrchestratorConfig,
    ) -> Result<JobRunSpec>;

    /// Number of job runs `config` calls for.
    fn count(&self, config: &RequestConfig) -> Result<usize>;

    /// Every desired spec for `request`, keyed by index.
    fn desired_resources(
        &self,
        request: &GenerationRequest,
        settings: &OrchestratorConfig,
    ) -> Result<BTreeMap<u32, JobRunSpec>> {
        let config = request.config().ok_or_else(|| {
            SbomGenError::configuration(format!(
                "unable to read configuration of request '{}'",
                request.name
            ))
        })?;
        let count = u32::try_from(self.count(config)?)
            .map_err(|_| SbomGenError::configuration("too many dependent resources"))?;
        (0..count)
            .map(|i| Ok((i, self.desired(config, i, request, settings)?)))
            .collect()
    }

    /// Observed runs belonging to this family, keyed by their name suffix.
    fn observed_resources<'a>(
        &self,
        request: &GenerationRequest,
        observed: &'a [ObservedJobRun],
    ) -> BTreeMap<u32, &'a ObservedJobRun> {
        let prefix = format!("{}-", dependent_resource_name(&request.name, self.phase()));
        observed
            .iter()
            .filter(|run| run.name.starts_with(&prefix))
            .filter_map(|run| index_from_name(&run.name).map(|i| (i, run)))
            .collect()
    }
}

/// Everything that varies between job-run families.
pub(crate) struct SpecParts<'a> {
    pub phase: GenerationPhase,
    pub index: u32,
    pub task_ref: &'a str,
    pub params: Vec<JobParam>,
}

/// Assemble a spec and stamp its fingerprint.
pub(crate) fn build_spec(
    parts: SpecParts<'_>,
    request: &GenerationRequest,
    settings: &OrchestratorConfig,
) -> Result<JobRunSpec> {
    tracing::debug!(
        "Preparing dependent resource for the '{}' phase related to '{}'",
        parts.phase,
        request.name
    );

    let mut run_labels = request.identity_labels();
    run_labels.insert(labels::PHASE.to_string(), parts.phase.as_str().to_string());
    run_labels.insert(labels::DELIVERABLE_INDEX.to_string(), parts.index.to_string());

    let mut spec = JobRunSpec {
        name: resource_name(&request.name, parts.phase, parts.index),
        labels: run_labels,
        annotations: BTreeMap::new(),
        params: parts.params,
        timeout: settings.timeout_duration()?,
        service_account: settings.service_account.clone(),
        task_ref: parts.task_ref.to_string(),
        workspace: WorkspaceBinding {
            name: settings.workspace_name.clone(),
            claim_name: settings.workspace_claim.clone(),
            sub_path: request.name.clone(),
        },
    };

    let canonical = serde_json::to_vec(&spec)?;
    spec.annotations
        .insert(SPEC_HASH_ANNOTATION.to_string(), fingerprint_hex(&canonical));
    Ok(spec)
}
