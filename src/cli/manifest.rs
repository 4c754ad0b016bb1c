//! Prepare-manifest command handler.
//!
//! Builds the POM that declares what a deliverable archive contains, from the
//! artifacts found when the archive was analysed. The POM is the manifest the
//! generator and the BOM reconciliation engine later work from.
//!
//! With a [`PomRecord`] the POM location is also written back to the
//! deliverable on the persisted request, which is what releases an OPERATION
//! request from PREPARING.

use super::desired::read_request;
use super::output::{write_output, OutputTarget};
use crate::model::{AnalyzedArtifact, PackageCoordinate};
use crate::parsers::PomModel;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Inputs of the `prepare-manifest` subcommand.
#[derive(Debug, Clone)]
pub struct PrepareManifestConfig {
    /// JSON array of analysed artifacts, or one purl per line
    pub artifacts: PathBuf,
    /// Deliverable archive URL; only artifacts found in it are kept
    pub url: Option<String>,
    pub operation_id: String,
    /// Product name, used as the POM group id
    pub group: String,
    /// Product milestone, used as the POM artifact id
    pub artifact: String,
    /// POM version; defaults to the archive file name
    pub version: Option<String>,
    pub output: Option<PathBuf>,
    pub record: Option<PomRecord>,
    pub quiet: bool,
}

/// Where to record the prepared POM.
#[derive(Debug, Clone)]
pub struct PomRecord {
    /// Persisted request resource (YAML or JSON), rewritten in place
    pub request: PathBuf,
    /// Position of the deliverable in the request configuration
    pub deliverable: usize,
    /// Workspace-relative POM reference; the output path when absent
    pub pom_ref: Option<String>,
}

/// Run the prepare-manifest command.
#[allow(clippy::needless_pass_by_value)]
pub fn run_prepare_manifest(config: PrepareManifestConfig) -> Result<()> {
    let pom_ref = match &config.record {
        Some(record) => match (&record.pom_ref, &config.output) {
            (Some(pom_ref), _) => Some(pom_ref.clone()),
            (None, Some(output)) => Some(output.display().to_string()),
            (None, None) => bail!("recording the POM on a request requires an output file"),
        },
        None => None,
    };

    let artifacts = read_artifacts(&config.artifacts)?;
    let pom = deliverable_pom(&artifacts, &config);
    let xml = pom.to_xml().context("failed to serialize POM")?;
    write_output(&xml, &OutputTarget::from_option(config.output.clone()), config.quiet)?;

    if let (Some(record), Some(pom_ref)) = (&config.record, pom_ref) {
        record_pom(record, pom_ref)?;
    }
    Ok(())
}

/// Set the POM of one deliverable on a persisted request.
fn record_pom(record: &PomRecord, pom_ref: String) -> Result<()> {
    let mut request = read_request(&record.request)?;
    let mut deliverables = request.deliverables().to_vec();
    let Some(deliverable) = deliverables.get_mut(record.deliverable) else {
        bail!(
            "request '{}' has no deliverable at position {}",
            request.name,
            record.deliverable
        );
    };
    deliverable.pom = Some(pom_ref);
    request.set_deliverables(deliverables)?;

    let resource = request.to_resource()?;
    let content = serde_yaml::to_string(&resource).context("failed to serialize request")?;
    std::fs::write(&record.request, content)
        .with_context(|| format!("failed to write {}", record.request.display()))?;
    tracing::info!(
        "Recorded POM of deliverable {} on request '{}'",
        record.deliverable,
        request.name
    );
    Ok(())
}

/// Read analysed artifacts from JSON, or from a plain purl-per-line list.
fn read_artifacts(path: &Path) -> Result<Vec<AnalyzedArtifact>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(&content)
            .with_context(|| format!("failed to parse analysed artifacts in {}", path.display()));
    }
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .zip(1u32..)
        .map(|(purl, n)| AnalyzedArtifact {
            id: n.to_string(),
            purl: purl.to_string(),
            archive_filenames: Vec::new(),
            distribution_url: None,
        })
        .collect())
}

/// Last path segment of a URL, without query or fragment.
fn file_name_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().filter(|name| !name.is_empty())
}

fn deliverable_pom(artifacts: &[AnalyzedArtifact], config: &PrepareManifestConfig) -> PomModel {
    let file_name = config
        .url
        .as_deref()
        .and_then(file_name_from_url)
        .unwrap_or("deliverable");
    let version = config.version.clone().unwrap_or_else(|| file_name.to_string());
    let group = config.group.replace(' ', "-").to_lowercase();

    let mut pom = PomModel::new(
        group,
        &config.artifact,
        version,
        format!(
            "POM representing the deliverable {file_name} analyzed with operation {}",
            config.operation_id
        ),
    );

    let in_deliverable: Vec<&AnalyzedArtifact> = artifacts
        .iter()
        .filter(|a| match (&config.url, &a.distribution_url) {
            (Some(url), Some(found_in)) => url == found_in,
            _ => true,
        })
        .collect();
    tracing::info!(
        "Retrieved {} artifacts in the deliverable, out of {} analysed artifacts",
        in_deliverable.len(),
        artifacts.len()
    );

    let mut added = 0usize;
    for artifact in in_deliverable {
        // Artifacts only ever seen inside another jar are not part of the deliverable itself.
        if !artifact.archive_filenames.is_empty() && !artifact.has_top_level_location() {
            tracing::debug!("Skipping nested artifact {}", artifact.purl);
            continue;
        }
        match PackageCoordinate::parse(&artifact.purl) {
            Ok(coordinate) if coordinate.is_maven() => {
                pom.add_dependency(&coordinate, &artifact.id);
                added += 1;
            }
            Ok(_) => tracing::debug!("Skipping non-maven artifact {}", artifact.purl),
            Err(e) => tracing::info!("Could not parse the purl {}: {}", artifact.purl, e),
        }
    }
    tracing::info!("Declared {} dependencies in the deliverable POM", added);
    pom
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: Option<&str>) -> PrepareManifestConfig {
        PrepareManifestConfig {
            artifacts: PathBuf::from("unused"),
            url: url.map(ToString::to_string),
            operation_id: "A1".to_string(),
            group: "Red Hat Data Grid".to_string(),
            artifact: "8.4.0.GA".to_string(),
            version: None,
            output: None,
            record: None,
            quiet: true,
        }
    }

    fn artifact(id: &str, purl: &str, locations: &[&str], url: Option<&str>) -> AnalyzedArtifact {
        AnalyzedArtifact {
            id: id.to_string(),
            purl: purl.to_string(),
            archive_filenames: locations.iter().map(ToString::to_string).collect(),
            distribution_url: url.map(ToString::to_string),
        }
    }

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(
            file_name_from_url("https://host/path/dg-8.4.0-server.zip?x=1"),
            Some("dg-8.4.0-server.zip")
        );
        assert_eq!(file_name_from_url("https://host/path/"), None);
    }

    #[test]
    fn test_deliverable_pom_filters_artifacts() {
        let url = "https://host/dg-server.zip";
        let artifacts = vec![
            artifact("1", "pkg:maven/org.acme/top@1.0?type=jar", &["dg/lib/top.jar"], Some(url)),
            artifact("2", "pkg:maven/org.acme/nested@1.0", &["dg/lib/top.jar!/lib/nested.jar"], Some(url)),
            artifact("3", "pkg:npm/left-pad@1.3.0", &["dg/web/left-pad.tgz"], Some(url)),
            artifact("4", "pkg:maven/org.acme/other@1.0", &["x/other.jar"], Some("https://host/other.zip")),
        ];

        let pom = deliverable_pom(&artifacts, &config(Some(url)));
        let deps = pom.dependency_list();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].artifact_id.as_deref(), Some("top"));
        assert_eq!(pom.group_id.as_deref(), Some("red-hat-data-grid"));
        assert_eq!(pom.artifact_id.as_deref(), Some("8.4.0.GA"));
        assert_eq!(pom.version.as_deref(), Some("dg-server.zip"));
        assert_eq!(
            pom.description.as_deref(),
            Some("POM representing the deliverable dg-server.zip analyzed with operation A1")
        );
    }

    #[test]
    fn test_prepared_poms_release_operation_request() {
        use crate::conditions::{Condition, PomsAvailable};
        use crate::config::OrchestratorConfig;
        use crate::model::{
            DeliverableConfig, GenerationRequest, GenerationType, OperationConfig, RequestConfig,
        };

        let dir = tempfile::tempdir().unwrap();
        let request_path = dir.path().join("request.yaml");
        let request = GenerationRequest::new("sbom-request-a1", "ID1", GenerationType::Operation, "A1")
            .with_config(RequestConfig::Operation(OperationConfig {
                operation_id: "A1".to_string(),
                deliverables: (0..2)
                    .map(|index| DeliverableConfig {
                        index,
                        url: format!("https://host/{index}.zip"),
                        pom: None,
                    })
                    .collect(),
                ..OperationConfig::default()
            }));
        std::fs::write(&request_path, serde_yaml::to_string(&request.to_resource().unwrap()).unwrap())
            .unwrap();
        let artifacts = dir.path().join("purls.txt");
        std::fs::write(&artifacts, "pkg:maven/org.acme/a@1\n").unwrap();

        let prepare = |position: usize| {
            let mut cfg = config(Some(format!("https://host/{position}.zip").as_str()));
            cfg.artifacts = artifacts.clone();
            cfg.output = Some(dir.path().join(format!("pom-{position}.xml")));
            cfg.record = Some(PomRecord {
                request: request_path.clone(),
                deliverable: position,
                pom_ref: Some(format!("sbom-request-a1/{position}/pom.xml")),
            });
            run_prepare_manifest(cfg).unwrap();
            read_request(&request_path).unwrap()
        };
        let settings = OrchestratorConfig::default();

        let partial = prepare(1);
        assert_eq!(partial.deliverables()[0].pom, None);
        assert_eq!(
            partial.deliverables()[1].pom.as_deref(),
            Some("sbom-request-a1/1/pom.xml")
        );
        assert!(!PomsAvailable.is_met(&partial, &[], &settings));

        let complete = prepare(0);
        assert!(PomsAvailable.is_met(&complete, &[], &settings));
        assert!(dir.path().join("pom-0.xml").exists());
    }

    #[test]
    fn test_record_without_output_is_rejected() {
        let mut cfg = config(None);
        cfg.record = Some(PomRecord {
            request: PathBuf::from("request.yaml"),
            deliverable: 0,
            pom_ref: None,
        });
        assert!(run_prepare_manifest(cfg).is_err());
    }

    #[test]
    fn test_read_purl_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("purls.txt");
        std::fs::write(&path, "# found\npkg:maven/org.acme/a@1\n\npkg:maven/org.acme/b@2\n").unwrap();
        let artifacts = read_artifacts(&path).unwrap();
        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[1].id, "2");
    }
}
