//! CLI command handlers.
//!
//! This module provides testable command handlers that are invoked by main.rs.
//! Each handler implements the business logic for a specific CLI subcommand.

mod desired;
mod generate;
mod intake;
mod manifest;
mod output;
mod reconcile;

pub use desired::{run_desired, DesiredConfig};
pub use generate::{run_generate, GenerateConfig};
pub use intake::{run_intake, IntakeCommandConfig};
pub use manifest::{run_prepare_manifest, PomRecord, PrepareManifestConfig};
pub use output::{write_output, OutputFormat, OutputTarget};
pub use reconcile::{run_reconcile_bom, ReconcileBomConfig};
