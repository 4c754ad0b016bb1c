//! Generate command handler.
//!
//! The command a generation job run executes. For each selected deliverable
//! it runs the configured generator against the deliverable's POM, then
//! reconciles the raw BOM with the POM's declared dependencies.
//!
//! The exit code is the [`GenerationResult`] code, which the orchestrator maps
//! back to the request result when the job run fails.

use crate::config::{GeneratorConfig, ReconcileConfig};
use crate::error::SbomGenError;
use crate::model::{DeliverableConfig, GenerationResult, OperationConfig};
use crate::reconcile::BomReconciler;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Inputs of the `generate` subcommand.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Operation configuration file (YAML or JSON)
    pub config: PathBuf,
    /// Position of the deliverable to process; every deliverable when absent
    pub index: Option<i64>,
    /// Directory per-deliverable work directories are created in
    pub workdir: PathBuf,
    /// Directory deliverable POM paths are relative to
    pub data_dir: PathBuf,
    /// Remove an existing deliverable work directory first
    pub force: bool,
    pub generator: GeneratorConfig,
    pub reconcile: ReconcileConfig,
}

/// Run the generate command. Returns the process exit code.
#[allow(clippy::needless_pass_by_value)]
pub fn run_generate(config: GenerateConfig) -> Result<i32> {
    Ok(generate(&config).code())
}

fn generate(config: &GenerateConfig) -> GenerationResult {
    tracing::info!("Reading configuration file from '{}'", config.config.display());
    if !config.config.is_file() {
        tracing::error!("Configuration file '{}' does not exist", config.config.display());
        return GenerationResult::ErrConfigMissing;
    }

    let operation = match read_operation_config(&config.config) {
        Ok(operation) => operation,
        Err(e) => {
            tracing::error!("Unable to read the configuration file: {:#}", e);
            return GenerationResult::ErrConfigInvalid;
        }
    };
    tracing::debug!("Configuration read successfully: {:?}", operation);

    let selected: Vec<(usize, &DeliverableConfig)> = match config.index {
        Some(index) => match select_deliverable(&operation, index) {
            Some(selected) => vec![selected],
            None => return GenerationResult::ErrIndexInvalid,
        },
        None => {
            tracing::debug!(
                "Generating SBOMs for all {} deliverables",
                operation.deliverables.len()
            );
            operation.deliverables.iter().enumerate().collect()
        }
    };

    for (position, deliverable) in selected {
        tracing::info!("Running SBOM generation for deliverable with index '{}'", position);
        if let Err(e) = generate_deliverable(config, &operation, position, deliverable) {
            tracing::error!("Generation process failed: {:#}", e);
            return GenerationResult::ErrGeneration;
        }
    }
    GenerationResult::Success
}

fn read_operation_config(path: &Path) -> Result<OperationConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    // YAML is a superset of JSON, so one parser covers both.
    let operation: OperationConfig =
        serde_yaml::from_str(&raw).context("unable to deserialize the configuration")?;
    Ok(operation)
}

fn select_deliverable(
    operation: &OperationConfig,
    index: i64,
) -> Option<(usize, &DeliverableConfig)> {
    if index < 0 {
        tracing::error!("Provided index '{}' is lower than minimal required: 0", index);
        return None;
    }
    let last = operation.deliverables.len().saturating_sub(1);
    let selected = usize::try_from(index)
        .ok()
        .and_then(|i| operation.deliverable(i).map(|d| (i, d)));
    if selected.is_none() {
        tracing::error!(
            "Provided index '{}' is out of the available range [0-{}]",
            index,
            last
        );
    }
    selected
}

fn generate_deliverable(
    config: &GenerateConfig,
    operation: &OperationConfig,
    position: usize,
    deliverable: &DeliverableConfig,
) -> Result<PathBuf> {
    let Some(pom) = deliverable.pom.as_deref().filter(|p| !p.trim().is_empty()) else {
        bail!("deliverable {position} has no POM");
    };
    let pom = config.data_dir.join(pom);
    tracing::info!("Path of POM file: {}", pom.display());

    let workdir = config.workdir.join(format!("deliverable-{position}"));
    prepare_workdir(&workdir, config.force)?;

    let mut command = render_command(&config.generator.command, &pom, &workdir);
    if let Some(args) = operation.product.generator.args.as_deref() {
        command.extend(args.split_whitespace().map(ToString::to_string));
    }
    run_command(&command)?;

    let raw = workdir.join(&config.generator.bom_path);
    let enhanced = config.reconcile.enhanced_path(&raw);
    let report = BomReconciler::new()
        .reconcile_files(&pom, &raw, &enhanced)
        .with_context(|| format!("failed to reconcile {}", raw.display()))?;
    tracing::info!(
        "Deliverable {} done: {} components, BOM available at '{}'",
        position,
        report.components_after,
        enhanced.display()
    );
    Ok(enhanced)
}

fn prepare_workdir(workdir: &Path, force: bool) -> Result<()> {
    if workdir.exists() {
        if !force {
            bail!(
                "work directory '{}' already exists, use --force to clean it up",
                workdir.display()
            );
        }
        tracing::debug!("Removing existing work directory '{}'", workdir.display());
        std::fs::remove_dir_all(workdir)
            .with_context(|| format!("failed to remove {}", workdir.display()))?;
    }
    std::fs::create_dir_all(workdir)
        .with_context(|| format!("failed to create {}", workdir.display()))
}

/// Substitute `{pom}` and `{workdir}` in every argument.
fn render_command(template: &[String], pom: &Path, workdir: &Path) -> Vec<String> {
    let pom = pom.display().to_string();
    let workdir = workdir.display().to_string();
    template
        .iter()
        .map(|arg| arg.replace("{pom}", &pom).replace("{workdir}", &workdir))
        .collect()
}

fn run_command(command: &[String]) -> Result<()> {
    let Some((program, args)) = command.split_first() else {
        bail!("generator command is empty");
    };
    let rendered = command
        .iter()
        .map(|arg| {
            if arg.contains(' ') {
                format!("\"{arg}\"")
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    tracing::info!("Running: '{}'", rendered);

    let status = Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("failed to start '{program}'"))?;
    if !status.success() {
        return Err(SbomGenError::tool_failure(
            format!("command '{rendered}' failed with {status}"),
            status.code(),
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &Path, index: Option<i64>) -> GenerateConfig {
        GenerateConfig {
            config: dir.join("config.yaml"),
            index,
            workdir: dir.join("work"),
            data_dir: dir.to_path_buf(),
            force: false,
            generator: GeneratorConfig::default(),
            reconcile: ReconcileConfig::default(),
        }
    }

    fn write_config(dir: &Path) {
        std::fs::write(
            dir.join("config.yaml"),
            "type: operation\noperationId: A1\ndeliverables:\n  - index: 0\n    url: https://example.com/a.zip\n    pom: req/0/pom.xml\n",
        )
        .unwrap();
    }

    #[test]
    fn test_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(run_generate(config(dir.path(), None)).unwrap(), 3);
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.yaml"), "deliverables: [").unwrap();
        assert_eq!(run_generate(config(dir.path(), None)).unwrap(), 2);
    }

    #[test]
    fn test_index_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path());
        assert_eq!(run_generate(config(dir.path(), Some(1))).unwrap(), 4);
        assert_eq!(run_generate(config(dir.path(), Some(-1))).unwrap(), 4);
    }

    #[test]
    fn test_render_command() {
        let template = vec!["tool".to_string(), "-f".to_string(), "{pom}".to_string(), "-o={workdir}".to_string()];
        let rendered = render_command(&template, Path::new("/d/pom.xml"), Path::new("/w/deliverable-0"));
        assert_eq!(rendered, ["tool", "-f", "/d/pom.xml", "-o=/w/deliverable-0"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_generator_failure() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path());
        let mut cfg = config(dir.path(), Some(0));
        cfg.generator.command = vec!["false".to_string()];
        assert_eq!(run_generate(cfg).unwrap(), 5);
    }

    #[cfg(unix)]
    #[test]
    fn test_generate_and_reconcile() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path());
        let pom_dir = dir.path().join("req/0");
        std::fs::create_dir_all(&pom_dir).unwrap();
        std::fs::write(
            pom_dir.join("pom.xml"),
            "<project><dependencies><dependency><groupId>org.acme</groupId>\
             <artifactId>lib</artifactId><version>1.0</version></dependency>\
             </dependencies></project>",
        )
        .unwrap();
        let raw = dir.path().join("raw.json");
        std::fs::write(
            &raw,
            r#"{"bomFormat":"CycloneDX","specVersion":"1.4","components":[]}"#,
        )
        .unwrap();

        let mut cfg = config(dir.path(), Some(0));
        cfg.generator.command = vec![
            "cp".to_string(),
            raw.display().to_string(),
            "{workdir}/bom.json".to_string(),
        ];
        assert_eq!(run_generate(cfg).unwrap(), 0);
        assert!(dir.path().join("work/deliverable-0/bom-enhanced.json").exists());
    }
}
