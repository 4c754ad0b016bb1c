//! **Automated SBOM generation for build and release artifacts.**
//!
//! `sbomgen` turns upstream lifecycle notifications into generation requests,
//! drives each request to completion by materializing job runs on an
//! execution platform, and repairs the BOMs those jobs produce so that every
//! dependency a deliverable declares is represented.
//!
//! ## Core Concepts & Modules
//!
//! - **[`intake`]**: Filters build and deliverable-analysis notifications and
//!   emits commands that create new [`GenerationRequest`]s.
//! - **[`orchestrator`]**: The level-triggered [`Reconciler`] that moves a
//!   request through `NEW -> PREPARING -> GENERATING -> SUCCESS | FAILED`, and
//!   the [`Controller`] that runs it over every live request.
//! - **[`materializer`]**: Derives the deterministic job-run specs a request
//!   calls for.
//! - **[`conditions`]**: Readiness predicates gating materialization.
//! - **[`reconcile`]**: The [`BomReconciler`], which clones the closest
//!   generated component for every declared dependency missing from a BOM.
//! - **[`parsers`]**: Maven POM, purl-list manifest and CycloneDX JSON readers
//!   and writers.
//!
//! ## Getting Started: Reconciling a BOM
//!
//! ```no_run
//! use std::path::Path;
//! use sbomgen::{parse_bom, parse_manifest, BomReconciler};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manifest = parse_manifest(Path::new("pom.xml"))?;
//!     let bom = parse_bom(Path::new("bom.json"))?;
//!
//!     let (reconciled, report) = BomReconciler::new().reconcile(&manifest, &bom);
//!     println!(
//!         "{} declared, {} -> {} components",
//!         report.declared,
//!         bom.components.len(),
//!         reconciled.components.len()
//!     );
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Driving Requests
//!
//! ```no_run
//! use std::sync::Arc;
//! use chrono::Utc;
//! use sbomgen::config::OrchestratorConfig;
//! use sbomgen::orchestrator::{Controller, InMemoryPlatform, InMemoryRequestStore, Reconciler};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(InMemoryRequestStore::new());
//!     let platform = Arc::new(InMemoryPlatform::new());
//!     let controller = Controller::new(
//!         store,
//!         Reconciler::new(platform, OrchestratorConfig::default()),
//!     );
//!
//!     let summary = controller.tick(Utc::now())?;
//!     println!("{} requests changed", summary.changed());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Command-Line Interface (CLI)
//!
//! The `sbomgen` binary exposes the BOM reconciliation engine, the in-job
//! `generate` command, manifest preparation and offline intake/materializer
//! inspection. See `sbomgen --help`.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
// Pedantic lints: allow categories that are design choices for this codebase
#![allow(
    // Doc completeness: # Errors / # Panics sections are aspirational
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    // Variable names like `raw`/`reconciled` are clear in context
    clippy::similar_names,
    clippy::module_name_repetitions
)]

pub mod cli;
pub mod conditions;
pub mod config;
pub mod error;
pub mod intake;
pub mod materializer;
pub mod model;
pub mod orchestrator;
pub mod parsers;
pub mod reconcile;
pub mod utils;

// Re-export main types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError, Validatable};
pub use error::{ErrorContext, OptionContext, Result, SbomGenError};
pub use intake::{NotificationConsumer, NotificationHandler};
pub use materializer::DependentResource;
pub use model::{
    Bom, Component, DeclaredManifest, GenerationRequest, GenerationResult, GenerationStatus,
    GenerationType, JobRunSpec, ObservedJobRun, PackageCoordinate,
};
pub use orchestrator::{Controller, Reconciler};
pub use parsers::{parse_bom, parse_bom_str, parse_manifest, parse_manifest_str, ParseError};
pub use reconcile::BomReconciler;
