use super::{build_spec, DependentResource, SpecParts};
use crate::config::OrchestratorConfig;
use crate::error::{Result, SbomGenError};
use crate::model::{GenerationPhase, GenerationRequest, JobParam, JobRunSpec, RequestConfig};

/// Parameter holding the serialized operation configuration.
pub const PARAM_OPERATION_CONFIG: &str = "operation-config";
/// Parameter holding the position of the deliverable within the configuration.
pub const PARAM_DELIVERABLE_INDEX: &str = "deliverable-index";

/// One generation job run per deliverable of an OPERATION request.
#[derive(Debug, Default, Clone, Copy)]
pub struct OperationGenerateResource;

impl DependentResource for OperationGenerateResource {
    fn phase(&self) -> GenerationPhase {
        GenerationPhase::OperationGenerate
    }

    fn count(&self, config: &RequestConfig) -> Result<usize> {
        config
            .as_operation()
            .map(|op| op.deliverables.len())
            .ok_or_else(|| SbomGenError::configuration("expected an operation configuration"))
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
                "deliverable index {index} out of range for request '{}'",
                request.name
            )));
        }
        build_spec(
            SpecParts {
                phase: self.phase(),
                index,
                task_ref: &settings.operation_generate_task,
                params: vec![
                    JobParam::new(PARAM_OPERATION_CONFIG, config.to_yaml()?),
                    JobParam::new(PARAM_DELIVERABLE_INDEX, index.to_string()),
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
    use crate::model::{
        labels, DeliverableConfig, GenerationType, ObservedJobRun, OperationConfig,
        ProductConfig,
    };

    fn request(deliverables: usize) -> GenerationRequest {
        GenerationRequest::new("sbom-request-op1-abcde", "ID1", GenerationType::Operation, "OP1")
            .with_config(RequestConfig::Operation(OperationConfig {
                operation_id: "OP1".to_string(),
                product: ProductConfig::default(),
                deliverables: (0..deliverables)
                    .map(|i| DeliverableConfig {
                        index: i as u32,
                        url: format!("https://example.com/d{i}.zip"),
                        pom: Some(format!("deliverable-{i}/pom.xml")),
                    })
                    .collect(),
            }))
    }

    #[test]
    fn test_desired_spec_fields() {
        let settings = OrchestratorConfig::default();
        let request = request(2);
        let spec = OperationGenerateResource
            .desired(request.config().unwrap(), 1, &request, &settings)
            .unwrap();

        assert_eq!(spec.name, "sbom-request-op1-abcde-3-operationgenerate-1");
        assert_eq!(spec.param(PARAM_DELIVERABLE_INDEX), Some("1"));
        assert!(spec.param(PARAM_OPERATION_CONFIG).unwrap().contains("OP1"));
        assert_eq!(spec.labels[labels::PHASE], "operationgenerate");
        assert_eq!(spec.labels[labels::GENERATION_REQUEST_ID], "ID1");
        assert_eq!(spec.labels[labels::OPERATION_ID], "OP1");
        assert_eq!(spec.workspace.sub_path, "sbom-request-op1-abcde");
        assert_eq!(spec.task_ref, "sbomer-operation-generate");
        assert_eq!(spec.timeout.as_secs(), 6 * 3600);
        assert!(spec.spec_hash().is_some());
    }

    #[test]
    fn test_desired_is_deterministic() {
        let settings = OrchestratorConfig::default();
        let request = request(3);
        let first = OperationGenerateResource.desired_resources(&request, &settings).unwrap();
        let second = OperationGenerateResource.desired_resources(&request, &settings).unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_index_out_of_range() {
        let settings = OrchestratorConfig::default();
        let request = request(1);
        assert!(OperationGenerateResource
            .desired(request.config().unwrap(), 1, &request, &settings)
            .is_err());
    }

    #[test]
    fn test_observed_resources_filtered_by_prefix() {
        let settings = OrchestratorConfig::default();
        let request = request(2);
        let desired = OperationGenerateResource.desired_resources(&request, &settings).unwrap();
        let mut observed: Vec<ObservedJobRun> =
            desired.values().map(ObservedJobRun::from_spec).collect();
        let mut foreign = observed[0].clone();
        foreign.name = "sbom-request-other-3-operationgenerate-0".to_string();
        observed.push(foreign);

        let mine = OperationGenerateResource.observed_resources(&request, &observed);
        assert_eq!(mine.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
    }
}
