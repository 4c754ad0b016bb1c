//! Runtime configuration carried by a generation request.
//!
//! The blob is a tagged union selected by request type. It is parsed and
//! checked once when a request is read, so the rest of the crate never sees
//! an unvalidated configuration.

use super::request::GenerationType;
use crate::error::{Result, SbomGenError};
use serde::{Deserialize, Deserializer, Serialize};

/// Generator selection for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductGenerator {
    /// Tool identifier, e.g. `cyclonedx-operation`
    #[serde(rename = "type", default = "default_tool")]
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
}

fn default_tool() -> String {
    "cyclonedx-operation".to_string()
}

impl Default for ProductGenerator {
    fn default() -> Self {
        Self {
            tool: default_tool(),
            version: None,
            args: None,
        }
    }
}

/// Per-product generation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductConfig {
    #[serde(default)]
    pub generator: ProductGenerator,
}

/// One deliverable of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverableConfig {
    #[serde(deserialize_with = "deserialize_index")]
    pub index: u32,
    /// Source archive the deliverable was analysed from
    pub url: String,
    /// Workspace-relative manifest path, filled by the preparatory phase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pom: Option<String>,
}

impl DeliverableConfig {
    /// Whether the preparatory phase has produced a manifest for this deliverable.
    #[must_use]
    pub fn has_pom(&self) -> bool {
        self.pom.as_deref().is_some_and(|p| !p.trim().is_empty())
    }
}

// Indices have been written both as numbers and as strings.
fn deserialize_index<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Index {
        Number(u32),
        Text(String),
    }

    match Index::deserialize(deserializer)? {
        Index::Number(n) => Ok(n),
        Index::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Configuration of a BUILD request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    pub build_id: String,
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

/// Configuration of an OPERATION request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationConfig {
    pub operation_id: String,
    #[serde(default)]
    pub product: ProductConfig,
    #[serde(default)]
    pub deliverables: Vec<DeliverableConfig>,
}

impl OperationConfig {
    /// Deliverable at `position` in the configuration.
    ///
    /// Job runs address deliverables by position, not by their `index` field.
    #[must_use]
    pub fn deliverable(&self, position: usize) -> Option<&DeliverableConfig> {
        self.deliverables.get(position)
    }
}

/// Tagged union of request configurations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RequestConfig {
    Build(BuildConfig),
    Operation(OperationConfig),
}

impl RequestConfig {
    /// Parse a JSON or YAML blob for a request of type `kind` whose
    /// correlation id is `correlation_id`.
    ///
    /// A blob without a `type` tag is read as `kind`.
    pub fn parse(raw: &str, kind: GenerationType, correlation_id: &str) -> Result<Self> {
        // YAML is a superset of JSON, so one parser covers both.
        let mut value: serde_yaml::Value = serde_yaml::from_str(raw)
            .map_err(|e| SbomGenError::configuration(format!("unparseable configuration: {e}")))?;

        let mapping = value
            .as_mapping_mut()
            .ok_or_else(|| SbomGenError::configuration("configuration must be a mapping"))?;
        if !mapping.contains_key("type") {
            mapping.insert("type".into(), kind.config_tag().into());
        }

        let config: Self = serde_yaml::from_value(value)
            .map_err(|e| SbomGenError::configuration(format!("invalid configuration: {e}")))?;
        config.check(kind, correlation_id)?;
        Ok(config)
    }

    fn check(&self, kind: GenerationType, correlation_id: &str) -> Result<()> {
        if self.kind() != kind {
            return Err(SbomGenError::configuration(format!(
                "{} configuration supplied for a {kind} request",
                self.kind()
            )));
        }
        let declared = self.correlation_id();
        if !declared.is_empty() && declared != correlation_id {
            return Err(SbomGenError::configuration(format!(
                "configuration refers to '{declared}' but the request is for '{correlation_id}'"
            )));
        }
        if let Self::Operation(op) = self {
            let mut seen = std::collections::BTreeSet::new();
            for d in &op.deliverables {
                if !seen.insert(d.index) {
                    return Err(SbomGenError::configuration(format!(
                        "duplicate deliverable index {}",
                        d.index
                    )));
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub const fn kind(&self) -> GenerationType {
        match self {
            Self::Build(_) => GenerationType::Build,
            Self::Operation(_) => GenerationType::Operation,
        }
    }

    #[must_use]
    pub fn correlation_id(&self) -> &str {
        match self {
            Self::Build(b) => &b.build_id,
            Self::Operation(o) => &o.operation_id,
        }
    }

    #[must_use]
    pub const fn as_operation(&self) -> Option<&OperationConfig> {
        match self {
            Self::Operation(o) => Some(o),
            Self::Build(_) => None,
        }
    }

    #[must_use]
    pub const fn as_build(&self) -> Option<&BuildConfig> {
        match self {
            Self::Build(b) => Some(b),
            Self::Operation(_) => None,
        }
    }

    /// Serialize to the YAML form stored on the request and passed to job runs.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Outcome of reading the configuration blob of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestConfigState {
    /// No blob has been attached yet
    Missing,
    Valid(RequestConfig),
    /// Blob present but rejected; kept verbatim so it round-trips
    Invalid { raw: String, error: String },
}

impl RequestConfigState {
    /// Classify an optional raw blob.
    #[must_use]
    pub fn from_raw(raw: Option<&str>, kind: GenerationType, correlation_id: &str) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::Missing,
            Some(raw) => match RequestConfig::parse(raw, kind, correlation_id) {
                Ok(config) => Self::Valid(config),
                Err(e) => Self::Invalid {
                    raw: raw.to_string(),
                    error: e.to_string(),
                },
            },
        }
    }

    #[must_use]
    pub const fn valid(&self) -> Option<&RequestConfig> {
        match self {
            Self::Valid(c) => Some(c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPERATION_YAML: &str = r"
type: operation
operationId: A5RPHL7Y3AIAA
product:
  generator:
    type: cyclonedx-operation
    version: 1.0.0
deliverables:
  - index: 0
    url: https://download.example.com/app-1.0.zip
    pom: A5RPHL7Y3AIAA/deliverable-0-pom.xml
  - index: '1'
    url: https://download.example.com/app-1.0-src.zip
";

    #[test]
    fn test_parse_operation_yaml() {
        let config =
            RequestConfig::parse(OPERATION_YAML, GenerationType::Operation, "A5RPHL7Y3AIAA")
                .unwrap();
        let op = config.as_operation().unwrap();
        assert_eq!(op.deliverables.len(), 2);
        assert!(op.deliverables[0].has_pom());
        assert_eq!(op.deliverables[1].index, 1);
        assert!(!op.deliverables[1].has_pom());
        assert_eq!(op.product.generator.version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_parse_json_without_tag() {
        let json = r#"{"operationId":"OP1","deliverables":[{"index":0,"url":"u"}]}"#;
        let config = RequestConfig::parse(json, GenerationType::Operation, "OP1").unwrap();
        assert_eq!(config.kind(), GenerationType::Operation);
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let err = RequestConfig::parse(OPERATION_YAML, GenerationType::Build, "A5RPHL7Y3AIAA")
            .unwrap_err();
        assert!(matches!(err, SbomGenError::Configuration(_)));
    }

    #[test]
    fn test_correlation_mismatch_rejected() {
        let err =
            RequestConfig::parse(OPERATION_YAML, GenerationType::Operation, "OTHER").unwrap_err();
        assert!(err.to_string().contains("OTHER"));
    }

    #[test]
    fn test_duplicate_index_rejected() {
        let yaml = "operationId: OP\ndeliverables:\n  - {index: 0, url: a}\n  - {index: 0, url: b}\n";
        assert!(RequestConfig::parse(yaml, GenerationType::Operation, "OP").is_err());
    }

    #[test]
    fn test_state_from_raw() {
        assert_eq!(
            RequestConfigState::from_raw(None, GenerationType::Build, "B1"),
            RequestConfigState::Missing
        );
        let invalid = RequestConfigState::from_raw(Some("[1, 2"), GenerationType::Build, "B1");
        assert!(matches!(invalid, RequestConfigState::Invalid { .. }));
        let valid = RequestConfigState::from_raw(
            Some("buildId: B1\nproducts:\n  - generator: {type: maven-cyclonedx}\n"),
            GenerationType::Build,
            "B1",
        );
        assert_eq!(valid.valid().and_then(RequestConfig::as_build).map(|b| b.products.len()), Some(1));
    }

    #[test]
    fn test_yaml_round_trip_keeps_tag() {
        let config =
            RequestConfig::parse(OPERATION_YAML, GenerationType::Operation, "A5RPHL7Y3AIAA")
                .unwrap();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("type: operation"));
        let reparsed =
            RequestConfig::parse(&yaml, GenerationType::Operation, "A5RPHL7Y3AIAA").unwrap();
        assert_eq!(reparsed, config);
    }
}
