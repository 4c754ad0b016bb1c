//! Maven POM manifests: reading declared dependencies and writing
//! deliverable POMs built from analysed artifacts.

use super::traits::{FormatConfidence, ManifestParser, ParseError};
use crate::model::{DeclaredManifest, PackageCoordinate, DEFAULT_MAVEN_PACKAGING};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

pub const POM_NAMESPACE: &str = "http://maven.apache.org/POM/4.0.0";
pub const DEFAULT_MODEL_VERSION: &str = "4.0.0";

/// Subset of the Maven project model that manifests use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "project", rename_all = "camelCase")]
pub struct PomModel {
    #[serde(rename = "@xmlns", default, skip_serializing_if = "Option::is_none")]
    pub xmlns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packaging: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<PomDependencies>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomDependencies {
    #[serde(default)]
    pub dependency: Vec<PomDependency>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomDependency {
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub artifact_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub dependency_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

static PROPERTY_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$\{([^}]+)\}$").expect("static regex"));

static INVALID_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("static regex"));

impl PomModel {
    /// New model with the POM namespace and model version set.
    #[must_use]
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            xmlns: Some(POM_NAMESPACE.to_string()),
            model_version: Some(DEFAULT_MODEL_VERSION.to_string()),
            group_id: Some(group_id.into()),
            artifact_id: Some(artifact_id.into()),
            version: Some(version.into()),
            packaging: Some("pom".to_string()),
            description: Some(description.into()),
            properties: None,
            dependencies: None,
        }
    }

    /// Declare a Maven coordinate, recording the analysis id it came from
    /// as a `group.artifact.version` property.
    pub fn add_dependency(&mut self, coordinate: &PackageCoordinate, origin_id: &str) {
        let packaging = coordinate.packaging().unwrap_or(DEFAULT_MAVEN_PACKAGING);
        let dependency = PomDependency {
            group_id: coordinate.namespace.clone(),
            artifact_id: Some(coordinate.name.clone()),
            version: coordinate.version.clone(),
            dependency_type: Some(packaging.to_string()),
            classifier: coordinate.classifier().map(ToString::to_string),
            scope: None,
        };
        tracing::debug!(
            "Adding {} (classifier: {:?}, origin: {})",
            coordinate.gav(),
            dependency.classifier,
            origin_id
        );

        let key = format!(
            "{}.{}.{}",
            dependency.group_id.as_deref().unwrap_or_default(),
            coordinate.name,
            dependency.version.as_deref().unwrap_or_default()
        );
        let key = INVALID_NAME_CHARS.replace_all(&key, "_").into_owned();
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(key, origin_id.to_string());
        self.dependencies
            .get_or_insert_with(PomDependencies::default)
            .dependency
            .push(dependency);
    }

    /// Declared dependencies.
    #[must_use]
    pub fn dependency_list(&self) -> &[PomDependency] {
        self.dependencies
            .as_ref()
            .map(|d| d.dependency.as_slice())
            .unwrap_or(&[])
    }

    /// Substitute a whole-value `${property}` reference.
    fn resolve(&self, value: Option<&str>) -> Option<String> {
        let value = value?.trim();
        let Some(caps) = PROPERTY_REF.captures(value) else {
            return Some(value.to_string());
        };
        let key = caps.get(1).map_or("", |m| m.as_str());
        match key {
            "project.version" | "pom.version" => self.version.clone(),
            "project.groupId" | "pom.groupId" => self.group_id.clone(),
            _ => self
                .properties
                .as_ref()
                .and_then(|p| p.get(key))
                .cloned()
                .or_else(|| Some(value.to_string())),
        }
    }

    /// Parse POM XML.
    pub fn from_xml(content: &str) -> Result<Self, ParseError> {
        Ok(quick_xml::de::from_str(content)?)
    }

    /// Render POM XML with a declaration and two-space indentation.
    pub fn to_xml(&self) -> Result<String, ParseError> {
        let mut body = String::new();
        let mut serializer = quick_xml::se::Serializer::new(&mut body);
        serializer.indent(' ', 2);
        self.serialize(serializer)
            .map_err(|e| ParseError::XmlError(e.to_string()))?;
        Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{body}\n"))
    }

    /// Declared manifest view of this POM.
    pub fn to_manifest(&self) -> Result<DeclaredManifest, ParseError> {
        let root = match (&self.group_id, &self.artifact_id) {
            (Some(g), Some(a)) => Some(PackageCoordinate::maven(
                g.trim(),
                a.trim(),
                self.resolve(self.version.as_deref()),
                self.packaging.as_deref(),
                None,
            )),
            _ => None,
        };

        let mut dependencies = Vec::with_capacity(self.dependency_list().len());
        for (i, dep) in self.dependency_list().iter().enumerate() {
            let group = self.resolve(dep.group_id.as_deref()).filter(|g| !g.is_empty());
            let artifact = dep
                .artifact_id
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty());
            let (Some(group), Some(artifact)) = (group, artifact) else {
                tracing::warn!(
                    "Skipping dependency[{}]: groupId and artifactId are required",
                    i
                );
                continue;
            };
            dependencies.push(PackageCoordinate::maven(
                group,
                artifact,
                self.resolve(dep.version.as_deref()),
                dep.dependency_type.as_deref().map(str::trim),
                dep.classifier.as_deref().map(str::trim),
            ));
        }

        Ok(DeclaredManifest { root, dependencies })
    }
}

/// Parser for Maven POM manifests.
#[derive(Debug, Default, Clone, Copy)]
pub struct PomParser;

impl PomParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ManifestParser for PomParser {
    fn parse_str(&self, content: &str) -> Result<DeclaredManifest, ParseError> {
        PomModel::from_xml(content)?.to_manifest()
    }

    fn format_name(&self) -> &str {
        "Maven POM"
    }

    fn confidence(&self, content: &str) -> FormatConfidence {
        let trimmed = content.trim_start();
        if !trimmed.starts_with('<') {
            return FormatConfidence::NONE;
        }
        if trimmed.contains("<project") {
            if trimmed.contains(POM_NAMESPACE) || trimmed.contains("<modelVersion>") {
                FormatConfidence::HIGH
            } else {
                FormatConfidence::MEDIUM
            }
        } else {
            FormatConfidence::LOW
        }
    }
}
