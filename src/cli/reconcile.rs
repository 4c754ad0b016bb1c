//! Reconcile-bom command handler.
//!
//! Runs the BOM reconciliation engine on a manifest and a raw BOM and writes
//! the reconciled BOM next to the input.

use super::output::{write_output, OutputFormat, OutputTarget};
use crate::config::ReconcileConfig;
use crate::reconcile::BomReconciler;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Inputs of the `reconcile-bom` subcommand.
#[derive(Debug, Clone)]
pub struct ReconcileBomConfig {
    pub manifest: PathBuf,
    pub bom: PathBuf,
    /// Reconciled BOM location; defaults to the enhanced path next to `bom`
    pub output: Option<PathBuf>,
    /// Where to print the run report, if anywhere
    pub report: Option<OutputFormat>,
    pub reconcile: ReconcileConfig,
    pub quiet: bool,
}

/// Run the reconcile-bom command. Returns the process exit code.
#[allow(clippy::needless_pass_by_value)]
pub fn run_reconcile_bom(config: ReconcileBomConfig) -> Result<i32> {
    let output = config
        .output
        .clone()
        .unwrap_or_else(|| config.reconcile.enhanced_path(&config.bom));

    tracing::info!(
        "Reconciling {} against {}",
        config.bom.display(),
        config.manifest.display()
    );
    let report = BomReconciler::new()
        .reconcile_files(&config.manifest, &config.bom, &output)
        .with_context(|| format!("failed to reconcile {}", config.bom.display()))?;

    if let Some(format) = config.report {
        write_output(&format.render(&report)?, &OutputTarget::Stdout, config.quiet)?;
    } else if !config.quiet {
        eprintln!(
            "{} declared, {} -> {} components ({} added, {} skipped), written to {}",
            report.declared,
            report.components_before,
            report.components_after,
            report.added.len(),
            report.skipped.len(),
            output.display()
        );
    }
    Ok(0)
}
