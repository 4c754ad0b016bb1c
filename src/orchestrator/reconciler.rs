//! Level-triggered reconciliation of a single generation request.
//!
//! Every call recomputes the desired job runs from the request, compares them
//! with what the platform reports and moves the request forward:
//!
//! ```text
//! NEW -> PREPARING (OPERATION only) -> GENERATING -> SUCCESS | FAILED
//! ```
//!
//! Calls are idempotent. The only side effect on the platform is creating
//! job runs that do not exist yet; existing runs are never touched.

use super::platform::{JobRunPlatform, PlatformError};
use crate::conditions::{Condition, ConfigAvailable, PomsAvailable};
use crate::config::OrchestratorConfig;
use crate::error::{Result, SbomGenError};
use crate::materializer::{self, dependent_resource_name};
use crate::model::{
    GenerationRequest, GenerationResult, GenerationStatus, GenerationType, JobRunSpec,
    JobRunState, ObservedJobRun, RequestConfigState,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// What a single reconcile call did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub request: String,
    pub previous: GenerationStatus,
    pub current: GenerationStatus,
    /// Names of job runs created by this call
    pub created: Vec<String>,
    /// Gate that held the request back, if any
    pub unmet_condition: Option<&'static str>,
    /// Job runs still pending or running
    pub in_progress: usize,
}

impl ReconcileReport {
    fn new(request: &GenerationRequest) -> Self {
        Self {
            request: request.name.clone(),
            previous: request.status(),
            current: request.status(),
            created: Vec::new(),
            unmet_condition: None,
            in_progress: 0,
        }
    }

    /// Whether the request status changed.
    #[must_use]
    pub fn status_changed(&self) -> bool {
        self.previous != self.current
    }

    /// Whether the call changed anything at all.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.status_changed() || !self.created.is_empty()
    }
}

/// A permanently failed index.
struct IndexFailure {
    index: u32,
    result: GenerationResult,
    message: String,
}

/// Drives requests through their lifecycle against a job-run platform.
pub struct Reconciler {
    platform: Arc<dyn JobRunPlatform>,
    settings: OrchestratorConfig,
}

impl Reconciler {
    pub fn new(platform: Arc<dyn JobRunPlatform>, settings: OrchestratorConfig) -> Self {
        Self { platform, settings }
    }

    #[must_use]
    pub const fn settings(&self) -> &OrchestratorConfig {
        &self.settings
    }

    /// Reconcile `request` as of `now`.
    ///
    /// On error the request is left exactly as it was; platform errors are
    /// transient and the next call retries.
    pub fn reconcile(
        &self,
        request: &mut GenerationRequest,
        now: DateTime<Utc>,
    ) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::new(request);
        if request.is_finished() {
            return Ok(report);
        }

        let mut next = request.clone();
        self.step(&mut next, now, &mut report)?;
        report.current = next.status();

        if report.status_changed() {
            tracing::info!(
                "Request '{}' moved from {} to {}",
                next.name,
                report.previous,
                report.current
            );
        }
        *request = next;
        Ok(report)
    }

    fn step(
        &self,
        request: &mut GenerationRequest,
        now: DateTime<Utc>,
        report: &mut ReconcileReport,
    ) -> Result<()> {
        if let RequestConfigState::Invalid { error, .. } = request.config_state() {
            let reason = format!("Configuration is invalid: {error}");
            tracing::error!("Request '{}': {}", request.name, reason);
            request.fail(GenerationResult::ErrConfigInvalid, reason)?;
            return Ok(());
        }

        let ready = match request.kind() {
            GenerationType::Operation => {
                if request.status() == GenerationStatus::New {
                    request.advance(GenerationStatus::Preparing)?;
                }
                self.gate(&PomsAvailable, request, report)
            }
            GenerationType::Build => self.gate(&ConfigAvailable, request, report),
        };
        if !ready {
            return Ok(());
        }
        let resource = materializer::for_type(request.kind());

        let desired = match resource.desired_resources(request, &self.settings) {
            Ok(desired) => desired,
            Err(SbomGenError::Configuration(message)) => {
                request.fail(GenerationResult::ErrConfigInvalid, message)?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let prefix = format!("{}-", dependent_resource_name(&request.name, resource.phase()));
        let listed = self.platform.list_by_prefix(&prefix)?;
        let observed = resource.observed_resources(request, &listed);

        report.created = self.create_missing(&desired, &observed)?;
        request.advance(GenerationStatus::Generating)?;

        self.aggregate(request, &desired, &observed, now, report)
    }

    fn gate(
        &self,
        condition: &dyn Condition,
        request: &GenerationRequest,
        report: &mut ReconcileReport,
    ) -> bool {
        let met = condition.is_met(request, &[], &self.settings);
        if !met {
            tracing::debug!(
                "Request '{}' waits in {}: {} not met",
                request.name,
                request.status(),
                condition.name()
            );
            report.unmet_condition = Some(condition.name());
        }
        met
    }

    /// Create every desired run with no observed counterpart.
    fn create_missing(
        &self,
        desired: &BTreeMap<u32, JobRunSpec>,
        observed: &BTreeMap<u32, &ObservedJobRun>,
    ) -> Result<Vec<String>> {
        let mut created = Vec::new();
        for (index, spec) in desired {
            if observed.contains_key(index) {
                continue;
            }
            match self.platform.create(spec) {
                Ok(_) => {
                    tracing::info!("Created job run '{}'", spec.name);
                    created.push(spec.name.clone());
                }
                // Lost a race with a concurrent create; the run exists either way
                Err(PlatformError::AlreadyExists(name)) => {
                    tracing::debug!("Job run '{}' already exists", name);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(created)
    }

    fn aggregate(
        &self,
        request: &mut GenerationRequest,
        desired: &BTreeMap<u32, JobRunSpec>,
        observed: &BTreeMap<u32, &ObservedJobRun>,
        now: DateTime<Utc>,
        report: &mut ReconcileReport,
    ) -> Result<()> {
        let mut failures = Vec::new();
        let mut in_progress = 0;

        for index in desired.keys() {
            let Some(run) = observed.get(index) else {
                in_progress += 1;
                continue;
            };
            match &run.state {
                JobRunState::Succeeded => {}
                JobRunState::Failed { exit_code, message } => {
                    let result = match exit_code.map(GenerationResult::from_code) {
                        Some(GenerationResult::Success) | None => GenerationResult::ErrGeneral,
                        Some(result) => result,
                    };
                    failures.push(IndexFailure {
                        index: *index,
                        result,
                        message: message.clone(),
                    });
                }
                JobRunState::TimedOut => failures.push(timeout_failure(*index, run)),
                JobRunState::Pending | JobRunState::Running if run.is_overdue(now) => {
                    failures.push(timeout_failure(*index, run));
                }
                JobRunState::Pending | JobRunState::Running => in_progress += 1,
            }
        }
        report.in_progress = in_progress;

        if let Some(first) = failures.first() {
            let indices: Vec<String> = failures.iter().map(|f| f.index.to_string()).collect();
            let reason = format!(
                "Generation failed for index {}: {}",
                indices.join(", "),
                first.message
            );
            tracing::error!("Request '{}': {}", request.name, reason);
            request.fail(first.result, reason)?;
        } else if in_progress == 0 {
            let output = self.settings.output_root.join(&request.name);
            request.succeed(output.display().to_string())?;
        } else {
            tracing::debug!(
                "Request '{}' has {} of {} job runs in progress",
                request.name,
                in_progress,
                desired.len()
            );
        }
        Ok(())
    }
}

fn timeout_failure(index: u32, run: &ObservedJobRun) -> IndexFailure {
    let err = SbomGenError::Timeout {
        name: run.name.clone(),
        seconds: run.timeout.as_secs(),
    };
    IndexFailure {
        index,
        result: GenerationResult::ErrTimeout,
        message: err.to_string(),
    }
}
