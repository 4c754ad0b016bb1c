//! Desired command handler.
//!
//! Prints the job runs a generation request calls for, as the orchestrator
//! would create them.

use super::output::{write_output, OutputFormat, OutputTarget};
use crate::config::OrchestratorConfig;
use crate::materializer;
use crate::model::{GenerationRequest, JobRunSpec, RequestResource};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Inputs of the `desired` subcommand.
#[derive(Debug, Clone)]
pub struct DesiredConfig {
    /// Persisted request resource (YAML or JSON)
    pub request: PathBuf,
    pub settings: OrchestratorConfig,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub quiet: bool,
}

/// Run the desired command.
#[allow(clippy::needless_pass_by_value)]
pub fn run_desired(config: DesiredConfig) -> Result<()> {
    let request = read_request(&config.request)?;
    let specs = desired_specs(&request, &config.settings)?;
    tracing::info!(
        "Request '{}' ({}) calls for {} job runs",
        request.name,
        request.kind(),
        specs.len()
    );
    write_output(
        &config.format.render(&specs)?,
        &OutputTarget::from_option(config.output),
        config.quiet,
    )
}

pub(super) fn read_request(path: &Path) -> Result<GenerationRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let resource: RequestResource = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse request resource {}", path.display()))?;
    GenerationRequest::from_resource(&resource)
        .with_context(|| format!("invalid request resource '{}'", resource.name))
}

fn desired_specs(
    request: &GenerationRequest,
    settings: &OrchestratorConfig,
) -> Result<Vec<JobRunSpec>> {
    let specs = materializer::for_type(request.kind())
        .desired_resources(request, settings)
        .with_context(|| format!("unable to materialize request '{}'", request.name))?;
    Ok(specs.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeliverableConfig, GenerationType, OperationConfig, RequestConfig};

    #[test]
    fn test_desired_from_resource_file() {
        let request = GenerationRequest::new("sbom-request-a1", "ID1", GenerationType::Operation, "A1")
            .with_config(RequestConfig::Operation(OperationConfig {
                operation_id: "A1".to_string(),
                deliverables: (0..2)
                    .map(|index| DeliverableConfig {
                        index,
                        url: format!("https://h/{index}.zip"),
                        pom: Some(format!("sbom-request-a1/{index}/pom.xml")),
                    })
                    .collect(),
                ..OperationConfig::default()
            }));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.yaml");
        std::fs::write(&path, serde_yaml::to_string(&request.to_resource().unwrap()).unwrap())
            .unwrap();

        let read = read_request(&path).unwrap();
        let specs = desired_specs(&read, &OrchestratorConfig::default()).unwrap();
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "sbom-request-a1-3-operationgenerate-0",
                "sbom-request-a1-3-operationgenerate-1"
            ]
        );
    }

    #[test]
    fn test_request_without_config_is_an_error() {
        let request = GenerationRequest::new("r", "ID1", GenerationType::Build, "B1");
        assert!(desired_specs(&request, &OrchestratorConfig::default()).is_err());
    }
}
