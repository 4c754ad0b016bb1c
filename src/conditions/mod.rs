//! Declarative gates evaluated on every reconcile tick.
//!
//! Conditions are pure predicates over the primary request, the job runs
//! observed for it and static configuration. They never mutate anything and
//! must stay cheap.

use crate::config::OrchestratorConfig;
use crate::model::{GenerationRequest, GenerationType, ObservedJobRun, RequestConfig};

/// A gate on a phase transition.
pub trait Condition: Send + Sync {
    /// Condition name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Whether the gate is open for `request`.
    fn is_met(
        &self,
        request: &GenerationRequest,
        observed: &[ObservedJobRun],
        config: &OrchestratorConfig,
    ) -> bool;
}

/// Every deliverable of an OPERATION request has a prepared manifest.
#[derive(Debug, Default, Clone, Copy)]
pub struct PomsAvailable;

impl Condition for PomsAvailable {
    fn name(&self) -> &'static str {
        "PomsAvailable"
    }

    fn is_met(
        &self,
        request: &GenerationRequest,
        _observed: &[ObservedJobRun],
        _config: &OrchestratorConfig,
    ) -> bool {
        if request.kind() != GenerationType::Operation {
            return false;
        }
        let deliverables = request.deliverables();
        let met = !deliverables.is_empty() && deliverables.iter().all(|d| d.has_pom());
        tracing::debug!("{} is met for '{}': {}", self.name(), request.name, met);
        met
    }
}

/// A BUILD request carries a valid configuration naming at least one product.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigAvailable;

impl Condition for ConfigAvailable {
    fn name(&self) -> &'static str {
        "ConfigAvailable"
    }

    fn is_met(
        &self,
        request: &GenerationRequest,
        _observed: &[ObservedJobRun],
        _config: &OrchestratorConfig,
    ) -> bool {
        let met = request.kind() == GenerationType::Build
            && matches!(
                request.config(),
                Some(RequestConfig::Build(build)) if !build.products.is_empty()
            );
        tracing::debug!("{} is met for '{}': {}", self.name(), request.name, met);
        met
    }
}
