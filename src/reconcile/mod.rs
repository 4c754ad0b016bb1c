//! BOM completeness repair.
//!
//! Generators sometimes collapse or miss artifacts that the deliverable
//! manifest declares. [`BomReconciler`] fills those gaps by cloning the
//! most similar generated component under the declared coordinate.

mod engine;
mod scoring;

pub use engine::{BomReconciler, ClonedComponent, ReconcileReport, SkippedDependency};
pub use scoring::{similarity, version_similarity, INELIGIBLE};
