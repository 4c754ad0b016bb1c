//! Generation requests and their persisted form.

use super::request_config::{DeliverableConfig, RequestConfig, RequestConfigState};
use crate::error::{Result, SbomGenError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Label keys used for indexed lookup of requests and job runs.
pub mod labels {
    pub const TYPE: &str = "sbomer.jboss.org/type";
    pub const STATUS: &str = "sbomer.jboss.org/status";
    pub const PHASE: &str = "sbomer.jboss.org/phase";
    pub const GENERATION_REQUEST: &str = "sbomer.jboss.org/generation-request";
    pub const GENERATION_REQUEST_ID: &str = "sbomer.jboss.org/generation-request-id";
    pub const BUILD_ID: &str = "sbomer.jboss.org/build-id";
    pub const OPERATION_ID: &str = "sbomer.jboss.org/operation-id";
    pub const DELIVERABLE_INDEX: &str = "sbomer.jboss.org/deliverable-index";

    /// Labels carried by every resource the system creates.
    pub fn defaults() -> Vec<(&'static str, &'static str)> {
        vec![
            ("app.kubernetes.io/part-of", "sbomer"),
            ("app.kubernetes.io/component", "sbom"),
            ("app.kubernetes.io/managed-by", "sbom"),
        ]
    }
}

/// Data keys of the persisted request mapping.
pub mod keys {
    pub const ID: &str = "id";
    pub const TYPE: &str = "type";
    pub const BUILD_ID: &str = "build-id";
    pub const OPERATION_ID: &str = "operation-id";
    pub const STATUS: &str = "status";
    pub const REASON: &str = "reason";
    pub const RESULT: &str = "result";
    pub const CONFIG: &str = "config";
    pub const OPERATION_CONFIG: &str = "operation-config";
    pub const OUTPUT: &str = "output";
}

// ============================================================================
// Enumerations
// ============================================================================

/// What a request generates BOMs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GenerationType {
    Build,
    Operation,
}

impl GenerationType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Build => "BUILD",
            Self::Operation => "OPERATION",
        }
    }

    /// Tag used inside the configuration blob.
    #[must_use]
    pub const fn config_tag(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Operation => "operation",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "BUILD" => Ok(Self::Build),
            "OPERATION" => Ok(Self::Operation),
            other => Err(SbomGenError::validation(format!(
                "unknown generation type '{other}'"
            ))),
        }
    }
}

impl fmt::Display for GenerationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a request.
///
/// `NEW -> PREPARING (operations only) -> GENERATING -> SUCCESS`, with
/// `FAILED` reachable from any non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GenerationStatus {
    New,
    Preparing,
    Generating,
    Success,
    Failed,
}

impl GenerationStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Preparing => "PREPARING",
            Self::Generating => "GENERATING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "NEW" => Ok(Self::New),
            "PREPARING" => Ok(Self::Preparing),
            "GENERATING" => Ok(Self::Generating),
            "SUCCESS" => Ok(Self::Success),
            "FAILED" => Ok(Self::Failed),
            other => Err(SbomGenError::validation(format!(
                "unknown generation status '{other}'"
            ))),
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }

    const fn rank(self) -> u8 {
        match self {
            Self::New => 0,
            Self::Preparing => 1,
            Self::Generating => 2,
            Self::Success | Self::Failed => 3,
        }
    }

    /// Whether moving from `self` to `next` respects the lifecycle.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            Self::Failed => true,
            Self::Success => matches!(self, Self::Generating),
            _ => next.rank() > self.rank(),
        }
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Steps a request may run job runs for. The ordinal is part of job run names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GenerationPhase {
    Init,
    Generate,
    OperationInit,
    OperationGenerate,
}

impl GenerationPhase {
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Init => 0,
            Self::Generate => 1,
            Self::OperationInit => 2,
            Self::OperationGenerate => 3,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Generate => "generate",
            Self::OperationInit => "operationinit",
            Self::OperationGenerate => "operationgenerate",
        }
    }
}

impl fmt::Display for GenerationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of a request, shared with the in-job command's exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationResult {
    Success,
    ErrGeneral,
    ErrConfigInvalid,
    ErrConfigMissing,
    ErrIndexInvalid,
    ErrGeneration,
    ErrTimeout,
    ErrSystem,
}

impl GenerationResult {
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::ErrGeneral => 1,
            Self::ErrConfigInvalid => 2,
            Self::ErrConfigMissing => 3,
            Self::ErrIndexInvalid => 4,
            Self::ErrGeneration => 5,
            Self::ErrTimeout => 6,
            Self::ErrSystem => 99,
        }
    }

    /// Map a job run exit code back to a result. Unknown codes are general errors.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Success,
            2 => Self::ErrConfigInvalid,
            3 => Self::ErrConfigMissing,
            4 => Self::ErrIndexInvalid,
            5 => Self::ErrGeneration,
            6 => Self::ErrTimeout,
            99 => Self::ErrSystem,
            _ => Self::ErrGeneral,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::ErrGeneral => "ERR_GENERAL",
            Self::ErrConfigInvalid => "ERR_CONFIG_INVALID",
            Self::ErrConfigMissing => "ERR_CONFIG_MISSING",
            Self::ErrIndexInvalid => "ERR_INDEX_INVALID",
            Self::ErrGeneration => "ERR_GENERATION",
            Self::ErrTimeout => "ERR_TIMEOUT",
            Self::ErrSystem => "ERR_SYSTEM",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        [
            Self::Success,
            Self::ErrGeneral,
            Self::ErrConfigInvalid,
            Self::ErrConfigMissing,
            Self::ErrIndexInvalid,
            Self::ErrGeneration,
            Self::ErrTimeout,
            Self::ErrSystem,
        ]
        .into_iter()
        .find(|r| r.as_str() == s.trim())
        .ok_or_else(|| SbomGenError::validation(format!("unknown generation result '{s}'")))
    }
}

impl fmt::Display for GenerationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Persisted form
// ============================================================================

/// String-keyed record as stored by the platform, with a separate label map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestResource {
    pub name: String,
    #[serde(default)]
    pub data: BTreeMap<String, String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

// ============================================================================
// GenerationRequest
// ============================================================================

/// A unit of generation work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Platform resource name; job run names are derived from it
    pub name: String,
    pub id: String,
    kind: GenerationType,
    /// Build id for BUILD requests, operation id for OPERATION requests
    correlation_id: String,
    status: GenerationStatus,
    reason: Option<String>,
    result: Option<GenerationResult>,
    config: RequestConfigState,
    output: Option<String>,
}

impl GenerationRequest {
    /// A fresh request in status `NEW`.
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        kind: GenerationType,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            kind,
            correlation_id: correlation_id.into(),
            status: GenerationStatus::New,
            reason: None,
            result: None,
            config: RequestConfigState::Missing,
            output: None,
        }
    }

    /// Attach a validated configuration.
    #[must_use]
    pub fn with_config(mut self, config: RequestConfig) -> Self {
        self.set_config(config);
        self
    }

    #[must_use]
    pub const fn kind(&self) -> GenerationType {
        self.kind
    }

    #[must_use]
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    #[must_use]
    pub const fn status(&self) -> GenerationStatus {
        self.status
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    #[must_use]
    pub const fn result(&self) -> Option<GenerationResult> {
        self.result
    }

    #[must_use]
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    #[must_use]
    pub const fn config_state(&self) -> &RequestConfigState {
        &self.config
    }

    #[must_use]
    pub const fn config(&self) -> Option<&RequestConfig> {
        self.config.valid()
    }

    /// Replace the configuration, e.g. once the preparatory phase has run.
    pub fn set_config(&mut self, config: RequestConfig) {
        self.config = RequestConfigState::Valid(config);
    }

    /// Deliverables of an OPERATION request; empty for anything else.
    #[must_use]
    pub fn deliverables(&self) -> &[DeliverableConfig] {
        self.config()
            .and_then(RequestConfig::as_operation)
            .map(|op| op.deliverables.as_slice())
            .unwrap_or(&[])
    }

    /// Record prepared deliverables on an OPERATION request.
    pub fn set_deliverables(&mut self, deliverables: Vec<DeliverableConfig>) -> Result<()> {
        match &mut self.config {
            RequestConfigState::Valid(RequestConfig::Operation(op)) => {
                op.deliverables = deliverables;
                Ok(())
            }
            _ => Err(SbomGenError::validation(format!(
                "request '{}' has no operation configuration to update",
                self.name
            ))),
        }
    }

    /// Whether the request reached SUCCESS or FAILED.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    /// Move to a non-terminal status. Same-status moves are no-ops.
    pub fn advance(&mut self, next: GenerationStatus) -> Result<bool> {
        if next.is_terminal() {
            return Err(SbomGenError::validation(format!(
                "use succeed/fail to reach {next}"
            )));
        }
        self.transition(next)
    }

    /// Terminal success with the aggregate output location.
    pub fn succeed(&mut self, output: impl Into<String>) -> Result<bool> {
        let changed = self.transition(GenerationStatus::Success)?;
        if changed {
            self.result = Some(GenerationResult::Success);
            self.reason = Some("Generation finished successfully".to_string());
            self.output = Some(output.into());
        }
        Ok(changed)
    }

    /// Terminal failure with a human-readable reason.
    pub fn fail(&mut self, result: GenerationResult, reason: impl Into<String>) -> Result<bool> {
        let changed = self.transition(GenerationStatus::Failed)?;
        if changed {
            self.result = Some(result);
            self.reason = Some(reason.into());
        }
        Ok(changed)
    }

    fn transition(&mut self, next: GenerationStatus) -> Result<bool> {
        if self.status == next {
            return Ok(false);
        }
        if !self.status.can_transition_to(next) {
            return Err(SbomGenError::validation(format!(
                "request '{}' cannot move from {} to {next}",
                self.name, self.status
            )));
        }
        self.status = next;
        Ok(true)
    }

    /// Labels identifying resources created on behalf of this request.
    #[must_use]
    pub fn identity_labels(&self) -> BTreeMap<String, String> {
        let mut map: BTreeMap<String, String> = labels::defaults()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        map.insert(labels::GENERATION_REQUEST_ID.to_string(), self.id.clone());
        map.insert(labels::TYPE.to_string(), self.kind.to_string());
        let correlation_label = match self.kind {
            GenerationType::Build => labels::BUILD_ID,
            GenerationType::Operation => labels::OPERATION_ID,
        };
        map.insert(correlation_label.to_string(), self.correlation_id.clone());
        map
    }

    // ------------------------------------------------------------------------
    // Persisted form
    // ------------------------------------------------------------------------

    /// Render to the persisted mapping.
    pub fn to_resource(&self) -> Result<RequestResource> {
        let mut data = BTreeMap::new();
        data.insert(keys::ID.to_string(), self.id.clone());
        data.insert(keys::TYPE.to_string(), self.kind.to_string());
        let (correlation_key, config_key) = match self.kind {
            GenerationType::Build => (keys::BUILD_ID, keys::CONFIG),
            GenerationType::Operation => (keys::OPERATION_ID, keys::OPERATION_CONFIG),
        };
        data.insert(correlation_key.to_string(), self.correlation_id.clone());
        data.insert(keys::STATUS.to_string(), self.status.to_string());
        if let Some(reason) = &self.reason {
            data.insert(keys::REASON.to_string(), reason.clone());
        }
        if let Some(result) = self.result {
            data.insert(keys::RESULT.to_string(), result.to_string());
        }
        if let Some(output) = &self.output {
            data.insert(keys::OUTPUT.to_string(), output.clone());
        }
        match &self.config {
            RequestConfigState::Missing => {}
            RequestConfigState::Valid(config) => {
                data.insert(config_key.to_string(), config.to_yaml()?);
            }
            RequestConfigState::Invalid { raw, .. } => {
                data.insert(config_key.to_string(), raw.clone());
            }
        }

        let mut resource_labels = self.identity_labels();
        resource_labels.insert(labels::STATUS.to_string(), self.status.to_string());
        resource_labels.insert(labels::GENERATION_REQUEST.to_string(), "yes".to_string());

        Ok(RequestResource {
            name: self.name.clone(),
            data,
            labels: resource_labels,
        })
    }

    /// Read from the persisted mapping. The configuration blob is validated
    /// here; a rejected blob is kept and surfaces later as a request failure.
    pub fn from_resource(resource: &RequestResource) -> Result<Self> {
        let get = |key: &str| resource.data.get(key).map(String::as_str);
        let require = |key: &str| {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| SbomGenError::missing_field(key, resource.name.clone()))
        };

        let kind = GenerationType::parse(require(keys::TYPE)?)?;
        let (correlation_key, config_key) = match kind {
            GenerationType::Build => (keys::BUILD_ID, keys::CONFIG),
            GenerationType::Operation => (keys::OPERATION_ID, keys::OPERATION_CONFIG),
        };
        let correlation_id = require(correlation_key)?.to_string();
        let status = get(keys::STATUS)
            .map(GenerationStatus::parse)
            .transpose()?
            .unwrap_or(GenerationStatus::New);
        let result = get(keys::RESULT).map(GenerationResult::parse).transpose()?;

        Ok(Self {
            name: resource.name.clone(),
            id: require(keys::ID)?.to_string(),
            kind,
            config: RequestConfigState::from_raw(get(config_key), kind, &correlation_id),
            correlation_id,
            status,
            reason: get(keys::REASON).map(ToString::to_string),
            result,
            output: get(keys::OUTPUT).map(ToString::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OperationConfig;

    fn operation_request() -> GenerationRequest {
        GenerationRequest::new(
            "sbom-request-op1-x7k2p",
            "OP1X7K2P",
            GenerationType::Operation,
            "OP1",
        )
        .with_config(RequestConfig::Operation(OperationConfig {
            operation_id: "OP1".to_string(),
            deliverables: vec![DeliverableConfig {
                index: 0,
                url: "https://example.com/a.zip".to_string(),
                pom: None,
            }],
            ..OperationConfig::default()
        }))
    }

    #[test]
    fn test_status_lifecycle() {
        let mut request = operation_request();
        assert!(request.advance(GenerationStatus::Preparing).unwrap());
        assert!(!request.advance(GenerationStatus::Preparing).unwrap());
        assert!(request.advance(GenerationStatus::Generating).unwrap());
        assert!(request.advance(GenerationStatus::Preparing).is_err());
        assert!(request.succeed("/data/x").unwrap());
        assert_eq!(request.result(), Some(GenerationResult::Success));
        assert!(request.fail(GenerationResult::ErrGeneral, "late").is_err());
        assert_eq!(request.status(), GenerationStatus::Success);
    }

    #[test]
    fn test_success_requires_generating() {
        let mut request = operation_request();
        assert!(request.succeed("/data/x").is_err());
        assert!(request.result().is_none());
    }

    #[test]
    fn test_fail_from_new() {
        let mut request = operation_request();
        assert!(request
            .fail(GenerationResult::ErrConfigInvalid, "bad config")
            .unwrap());
        assert_eq!(request.reason(), Some("bad config"));
        // Repeated failure is a no-op rather than an error.
        assert!(!request.fail(GenerationResult::ErrGeneral, "again").unwrap());
        assert_eq!(request.result(), Some(GenerationResult::ErrConfigInvalid));
    }

    #[test]
    fn test_resource_round_trip() {
        let mut request = operation_request();
        request.advance(GenerationStatus::Preparing).unwrap();
        let resource = request.to_resource().unwrap();
        assert_eq!(resource.data[keys::OPERATION_ID], "OP1");
        assert_eq!(resource.labels[labels::STATUS], "PREPARING");
        assert_eq!(resource.labels[labels::TYPE], "OPERATION");
        assert!(resource.data[keys::OPERATION_CONFIG].contains("operationId: OP1"));

        let back = GenerationRequest::from_resource(&resource).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn test_from_resource_keeps_invalid_config() {
        let mut resource = operation_request().to_resource().unwrap();
        resource
            .data
            .insert(keys::OPERATION_CONFIG.to_string(), "{not: [valid".to_string());
        let request = GenerationRequest::from_resource(&resource).unwrap();
        assert!(matches!(
            request.config_state(),
            RequestConfigState::Invalid { .. }
        ));
        assert!(request.deliverables().is_empty());
    }

    #[test]
    fn test_from_resource_missing_type() {
        let resource = RequestResource {
            name: "r".to_string(),
            ..RequestResource::default()
        };
        assert!(GenerationRequest::from_resource(&resource).is_err());
    }

    #[test]
    fn test_result_codes() {
        for code in [0, 2, 3, 4, 5, 6, 99] {
            assert_eq!(GenerationResult::from_code(code).code(), code);
        }
        assert_eq!(GenerationResult::from_code(42), GenerationResult::ErrGeneral);
        assert_eq!(
            GenerationResult::parse("ERR_INDEX_INVALID").unwrap(),
            GenerationResult::ErrIndexInvalid
        );
    }

    #[test]
    fn test_set_deliverables_requires_operation() {
        let mut build = GenerationRequest::new("b", "B", GenerationType::Build, "BLD");
        assert!(build.set_deliverables(Vec::new()).is_err());

        let mut op = operation_request();
        op.set_deliverables(vec![DeliverableConfig {
            index: 0,
            url: "u".to_string(),
            pom: Some("OP1/0/pom.xml".to_string()),
        }])
        .unwrap();
        assert!(op.deliverables()[0].has_pom());
    }
}
