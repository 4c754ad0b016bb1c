//! Seams to the external execution platform and request store.
//!
//! The orchestrator only ever lists and creates job runs and reads and
//! updates requests. In-memory implementations back the CLI and tests.

use crate::error::SbomGenError;
use crate::model::{JobRunSpec, JobRunState, ObservedJobRun, RequestResource};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// Failures talking to the platform or the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("platform unavailable: {0}")]
    Unavailable(String),

    #[error("resource '{0}' already exists")]
    AlreadyExists(String),

    #[error("resource '{0}' not found")]
    NotFound(String),
}

impl From<PlatformError> for SbomGenError {
    fn from(err: PlatformError) -> Self {
        Self::Transient(err.to_string())
    }
}

/// Executes job runs.
pub trait JobRunPlatform: Send + Sync {
    /// Job runs whose name starts with `prefix`.
    fn list_by_prefix(&self, prefix: &str) -> Result<Vec<ObservedJobRun>, PlatformError>;

    /// Submit a new job run. Fails with `AlreadyExists` if the name is taken.
    fn create(&self, spec: &JobRunSpec) -> Result<ObservedJobRun, PlatformError>;
}

/// Persists generation requests.
pub trait RequestStore: Send + Sync {
    fn list(&self) -> Result<Vec<RequestResource>, PlatformError>;

    fn get(&self, name: &str) -> Result<Option<RequestResource>, PlatformError>;

    /// Add a request. Fails with `AlreadyExists` if the name is taken.
    fn create(&self, resource: RequestResource) -> Result<(), PlatformError>;

    /// Replace an existing request. Fails with `NotFound` if it was removed.
    fn update(&self, resource: &RequestResource) -> Result<(), PlatformError>;
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, PlatformError> {
    lock.read()
        .map_err(|_| PlatformError::Unavailable("lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, PlatformError> {
    lock.write()
        .map_err(|_| PlatformError::Unavailable("lock poisoned".to_string()))
}

// ============================================================================
// In-memory platform
// ============================================================================

/// Job-run platform held in memory.
///
/// Every submitted spec is recorded in creation order, so callers can check
/// that no job run was ever created twice.
#[derive(Debug, Default)]
pub struct InMemoryPlatform {
    runs: RwLock<BTreeMap<String, ObservedJobRun>>,
    submitted: RwLock<Vec<JobRunSpec>>,
    offline: AtomicBool,
}

impl InMemoryPlatform {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every call fails with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), PlatformError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(PlatformError::Unavailable("platform offline".to_string()))
        } else {
            Ok(())
        }
    }

    /// Record a run as started at `at`.
    pub fn start(&self, name: &str, at: DateTime<Utc>) -> Result<(), PlatformError> {
        let mut runs = write(&self.runs)?;
        let run = runs
            .get_mut(name)
            .ok_or_else(|| PlatformError::NotFound(name.to_string()))?;
        run.state = JobRunState::Running;
        run.started_at = Some(at);
        Ok(())
    }

    /// Overwrite the state of a run, as the platform would on completion.
    pub fn set_state(&self, name: &str, state: JobRunState) -> Result<(), PlatformError> {
        let mut runs = write(&self.runs)?;
        let run = runs
            .get_mut(name)
            .ok_or_else(|| PlatformError::NotFound(name.to_string()))?;
        run.state = state;
        Ok(())
    }

    /// Insert an observed run directly, bypassing creation.
    pub fn insert(&self, run: ObservedJobRun) -> Result<(), PlatformError> {
        write(&self.runs)?.insert(run.name.clone(), run);
        Ok(())
    }

    /// Every spec submitted so far, in order.
    pub fn submitted(&self) -> Result<Vec<JobRunSpec>, PlatformError> {
        Ok(read(&self.submitted)?.clone())
    }

    /// Every run currently known.
    pub fn runs(&self) -> Result<Vec<ObservedJobRun>, PlatformError> {
        Ok(read(&self.runs)?.values().cloned().collect())
    }
}

impl JobRunPlatform for InMemoryPlatform {
    fn list_by_prefix(&self, prefix: &str) -> Result<Vec<ObservedJobRun>, PlatformError> {
        self.check_online()?;
        Ok(read(&self.runs)?
            .range(prefix.to_string()..)
            .take_while(|(name, _)| name.starts_with(prefix))
            .map(|(_, run)| run.clone())
            .collect())
    }

    fn create(&self, spec: &JobRunSpec) -> Result<ObservedJobRun, PlatformError> {
        self.check_online()?;
        let mut runs = write(&self.runs)?;
        if runs.contains_key(&spec.name) {
            return Err(PlatformError::AlreadyExists(spec.name.clone()));
        }
        let run = ObservedJobRun::from_spec(spec);
        runs.insert(spec.name.clone(), run.clone());
        write(&self.submitted)?.push(spec.clone());
        Ok(run)
    }
}

// ============================================================================
// In-memory request store
// ============================================================================

/// Request store held in memory, keyed by resource name. Listing returns
/// requests in arrival order.
#[derive(Debug, Default)]
pub struct InMemoryRequestStore {
    requests: RwLock<IndexMap<String, RequestResource>>,
}

impl InMemoryRequestStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a request, as an external retention policy would.
    pub fn remove(&self, name: &str) -> Result<Option<RequestResource>, PlatformError> {
        Ok(write(&self.requests)?.shift_remove(name))
    }

    pub fn len(&self) -> usize {
        read(&self.requests).map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RequestStore for InMemoryRequestStore {
    fn list(&self) -> Result<Vec<RequestResource>, PlatformError> {
        Ok(read(&self.requests)?.values().cloned().collect())
    }

    fn get(&self, name: &str) -> Result<Option<RequestResource>, PlatformError> {
        Ok(read(&self.requests)?.get(name).cloned())
    }

    fn create(&self, resource: RequestResource) -> Result<(), PlatformError> {
        let mut requests = write(&self.requests)?;
        if requests.contains_key(&resource.name) {
            return Err(PlatformError::AlreadyExists(resource.name));
        }
        requests.insert(resource.name.clone(), resource);
        Ok(())
    }

    fn update(&self, resource: &RequestResource) -> Result<(), PlatformError> {
        let mut requests = write(&self.requests)?;
        match requests.get_mut(&resource.name) {
            Some(existing) => {
                *existing = resource.clone();
                Ok(())
            }
            None => Err(PlatformError::NotFound(resource.name.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{JobParam, WorkspaceBinding};
    use std::time::Duration;

    fn spec(name: &str) -> JobRunSpec {
        JobRunSpec {
            name: name.to_string(),
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
            params: vec![JobParam::new("index", "0")],
            timeout: Duration::from_secs(60),
            service_account: "sa".to_string(),
            task_ref: "task".to_string(),
            workspace: WorkspaceBinding {
                name: "data".to_string(),
                claim_name: "claim".to_string(),
                sub_path: "req".to_string(),
            },
        }
    }

    #[test]
    fn test_create_once() {
        let platform = InMemoryPlatform::new();
        platform.create(&spec("req-1-generate-0")).unwrap();
        let err = platform.create(&spec("req-1-generate-0")).unwrap_err();
        assert_eq!(err, PlatformError::AlreadyExists("req-1-generate-0".to_string()));
        assert_eq!(platform.submitted().unwrap().len(), 1);
    }

    #[test]
    fn test_list_by_prefix() {
        let platform = InMemoryPlatform::new();
        platform.create(&spec("req-a-1-generate-0")).unwrap();
        platform.create(&spec("req-a-1-generate-1")).unwrap();
        platform.create(&spec("req-b-1-generate-0")).unwrap();
        assert_eq!(platform.list_by_prefix("req-a-").unwrap().len(), 2);
        assert!(platform.list_by_prefix("req-c-").unwrap().is_empty());
    }

    #[test]
    fn test_offline_is_transient() {
        let platform = InMemoryPlatform::new();
        platform.set_offline(true);
        let err: SbomGenError = platform.list_by_prefix("x").unwrap_err().into();
        assert!(err.is_transient());
    }

    #[test]
    fn test_store_update_requires_existing() {
        let store = InMemoryRequestStore::new();
        let resource = RequestResource {
            name: "req".to_string(),
            ..RequestResource::default()
        };
        assert!(store.update(&resource).is_err());
        store.create(resource.clone()).unwrap();
        assert!(store.update(&resource).is_ok());
        assert!(store.create(resource).is_err());
        assert_eq!(store.len(), 1);
    }
}
