//! Periodic reconciliation of every live request in the store.

use super::platform::{PlatformError, RequestStore};
use super::reconciler::{ReconcileReport, Reconciler};
use crate::error::Result;
use crate::model::{GenerationRequest, RequestResource};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;

/// Outcome of one pass over the store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickSummary {
    /// Requests that were reconciled successfully
    pub reports: Vec<ReconcileReport>,
    /// Requests that could not be reconciled this pass, with the reason
    pub errors: Vec<(String, String)>,
    /// Requests skipped because they already finished
    pub finished: usize,
}

impl TickSummary {
    #[must_use]
    pub fn changed(&self) -> usize {
        self.reports.iter().filter(|r| r.changed()).count()
    }
}

/// Reconciles all non-terminal requests, each at most once per tick.
pub struct Controller {
    store: Arc<dyn RequestStore>,
    reconciler: Reconciler,
}

impl Controller {
    pub fn new(store: Arc<dyn RequestStore>, reconciler: Reconciler) -> Self {
        Self { store, reconciler }
    }

    #[must_use]
    pub const fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// One level-triggered pass. Distinct requests are reconciled in parallel.
    pub fn tick(&self, now: DateTime<Utc>) -> Result<TickSummary> {
        let resources = self.store.list()?;
        let mut summary = TickSummary::default();
        let mut live = Vec::with_capacity(resources.len());

        for resource in &resources {
            match GenerationRequest::from_resource(resource) {
                Ok(request) if request.is_finished() => summary.finished += 1,
                Ok(request) => live.push(request),
                Err(e) => {
                    tracing::error!("Cannot read request '{}': {}", resource.name, e);
                    summary.errors.push((resource.name.clone(), e.to_string()));
                }
            }
        }

        tracing::debug!(
            "Reconciling {} live requests ({} finished)",
            live.len(),
            summary.finished
        );

        let outcomes: Vec<(String, Result<Option<ReconcileReport>>)> = live
            .into_par_iter()
            .map(|mut request| {
                let name = request.name.clone();
                let outcome = self.reconcile_and_store(&mut request, now);
                (name, outcome)
            })
            .collect();

        for (name, outcome) in outcomes {
            match outcome {
                Ok(Some(report)) => summary.reports.push(report),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Reconciliation of '{}' failed, will retry: {}", name, e);
                    summary.errors.push((name, e.to_string()));
                }
            }
        }
        Ok(summary)
    }

    /// Reconcile a single request by name. Absent requests are not an error.
    pub fn reconcile_named(
        &self,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ReconcileReport>> {
        let Some(resource) = self.store.get(name)? else {
            tracing::debug!("Request '{}' no longer exists", name);
            return Ok(None);
        };
        let mut request = GenerationRequest::from_resource(&resource)?;
        self.reconcile_and_store(&mut request, now)
    }

    fn reconcile_and_store(
        &self,
        request: &mut GenerationRequest,
        now: DateTime<Utc>,
    ) -> Result<Option<ReconcileReport>> {
        let report = self.reconciler.reconcile(request, now)?;
        if report.status_changed() {
            let resource: RequestResource = request.to_resource()?;
            match self.store.update(&resource) {
                Ok(()) => {}
                // Removed by retention while we worked
                Err(PlatformError::NotFound(name)) => {
                    tracing::debug!("Request '{}' was removed, dropping update", name);
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(Some(report))
    }
}
