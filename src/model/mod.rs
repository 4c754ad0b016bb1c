//! Data model: generation requests, job runs, package coordinates, BOMs and manifests.

mod bom;
mod coordinate;
mod job_run;
mod manifest;
mod request;
mod request_config;

pub use bom::{Bom, Component, Dependency, ExternalReference, Metadata, Property};
pub use coordinate::{PackageCoordinate, DEFAULT_MAVEN_PACKAGING};
pub use job_run::{
    JobParam, JobRunSpec, JobRunState, ObservedJobRun, WorkspaceBinding, SPEC_HASH_ANNOTATION,
};
pub use manifest::{AnalyzedArtifact, DeclaredManifest};
pub use request::{
    keys, labels, GenerationPhase, GenerationRequest, GenerationResult, GenerationStatus,
    GenerationType, RequestResource,
};
pub use request_config::{
    BuildConfig, DeliverableConfig, OperationConfig, ProductConfig, ProductGenerator,
    RequestConfig, RequestConfigState,
};
