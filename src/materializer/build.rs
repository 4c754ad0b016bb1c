use super::{build_spec, DependentResource, SpecParts};
use crate::config::OrchestratorConfig;
use crate::error::{Result, SbomGenError};
use crate::model::{GenerationPhase, GenerationRequest, JobParam, JobRunSpec, RequestConfig};

/// Parameter holding the serialized build configuration.
pub const PARAM_CONFIG: &str = "config";
/// Parameter holding the product position.
pub const PARAM_INDEX: &str = "index";

/// One generation job run per product of a BUILD request.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuildGenerateResource;

impl DependentResource for BuildGenerateResource {
    fn phase(&self) -> GenerationPhase {
        GenerationPhase::Generate
    }

    fn count(&self, config: &RequestConfig) -> Result<usize> {
        config
            .as_build()
            .map(|build| build.products.len())
            .ok_or_else(|| SbomGenError::configuration("expected a build configuration"))
    }

    fn desired(
        &self,
        config: &RequestConfig,
        index: u32,
        request: &GenerationRequest,
        settings: &OrchestratorConfig,
    ) -> Result<JobRunSpec> {
        if index as usize >= self.count(config)? {
            return Err(SbomGenError::validation(format!(
                "product index {index} out of range for request '{}'",
                request.name
            )));
        }
        build_spec(
            SpecParts {
                phase: self.phase(),
                index,
                task_ref: &settings.build_generate_task,
                params: vec![
                    JobParam::new(PARAM_CONFIG, config.to_yaml()?),
                    JobParam::new(PARAM_INDEX, index.to_string()),
                ],
            },
            request,
            settings,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{labels, BuildConfig, GenerationType, ProductConfig};

    #[test]
    fn test_one_spec_per_product() {
        let request = GenerationRequest::new("sbom-request-b1-xyz", "ID2", GenerationType::Build, "B1")
            .with_config(RequestConfig::Build(BuildConfig {
                build_id: "B1".to_string(),
                products: vec![ProductConfig::default(), ProductConfig::default()],
            }));
        let specs = BuildGenerateResource
            .desired_resources(&request, &OrchestratorConfig::default())
            .unwrap();

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[&1].name, "sbom-request-b1-xyz-1-generate-1");
        assert_eq!(specs[&1].param(PARAM_INDEX), Some("1"));
        assert_eq!(specs[&0].labels[labels::BUILD_ID], "B1");
        assert_eq!(specs[&0].task_ref, "sbomer-generate");
    }

    #[test]
    fn test_rejects_operation_config() {
        let request = GenerationRequest::new("r", "ID", GenerationType::Build, "B1");
        let err = BuildGenerateResource
            .desired_resources(&request, &OrchestratorConfig::default())
            .unwrap_err();
        assert!(matches!(err, SbomGenError::Configuration(_)));
    }
}
