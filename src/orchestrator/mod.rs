//! Generation request orchestration.
//!
//! [`Reconciler`] drives one request through its lifecycle; [`Controller`]
//! runs it over every live request in a [`RequestStore`]. The platform that
//! executes job runs is reached only through [`JobRunPlatform`].

mod controller;
mod platform;
mod reconciler;

pub use controller::{Controller, TickSummary};
pub use platform::{
    InMemoryPlatform, InMemoryRequestStore, JobRunPlatform, PlatformError, RequestStore,
};
pub use reconciler::{ReconcileReport, Reconciler};
