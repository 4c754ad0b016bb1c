//! CycloneDX BOM document model.
//!
//! Only the fields the reconciliation engine reads or writes are typed;
//! everything else is carried through untouched in `extra` maps so a
//! reconciled BOM keeps all of the generator's output.

use super::coordinate::PackageCoordinate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level CycloneDX document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bom {
    #[serde(default = "default_bom_format")]
    pub bom_format: String,
    #[serde(default)]
    pub spec_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<Dependency>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_bom_format() -> String {
    "CycloneDX".to_string()
}

impl Default for Bom {
    fn default() -> Self {
        Self {
            bom_format: default_bom_format(),
            spec_version: "1.4".to_string(),
            serial_number: None,
            version: Some(1),
            metadata: None,
            components: Vec::new(),
            dependencies: None,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<Component>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A BOM component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    #[serde(rename = "type", default = "default_component_type")]
    pub component_type: String,
    #[serde(rename = "bom-ref", alias = "bomRef", default, skip_serializing_if = "Option::is_none")]
    pub bom_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashes: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub licenses: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_references: Option<Vec<ExternalReference>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<Property>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_component_type() -> String {
    "library".to_string()
}

impl Component {
    /// Minimal library component for a coordinate.
    #[must_use]
    pub fn library(coordinate: &PackageCoordinate) -> Self {
        let purl = coordinate.to_string();
        Self {
            component_type: default_component_type(),
            bom_ref: Some(purl.clone()),
            author: None,
            publisher: None,
            group: coordinate.namespace.clone(),
            name: coordinate.name.clone(),
            version: coordinate.version.clone(),
            description: None,
            scope: None,
            hashes: None,
            licenses: None,
            purl: Some(purl),
            external_references: None,
            properties: None,
            extra: Map::new(),
        }
    }

    /// Parsed package coordinate, if the component carries a valid purl.
    #[must_use]
    pub fn coordinate(&self) -> Option<PackageCoordinate> {
        self.purl
            .as_deref()
            .and_then(|p| PackageCoordinate::parse(p).ok())
    }

    /// Copy of this component re-identified as `coordinate`.
    ///
    /// Identity (bom-ref, purl, version) comes from `coordinate`. Descriptive
    /// fields are copied; hashes are not, since they describe the source
    /// artifact's bytes.
    #[must_use]
    pub fn clone_with_coordinate(&self, coordinate: &PackageCoordinate) -> Self {
        let purl = coordinate.to_string();
        Self {
            component_type: self.component_type.clone(),
            bom_ref: Some(purl.clone()),
            author: self.author.clone(),
            publisher: self.publisher.clone(),
            group: self.group.clone(),
            name: self.name.clone(),
            version: coordinate.version.clone(),
            description: self.description.clone(),
            scope: self.scope.clone(),
            hashes: None,
            licenses: self.licenses.clone(),
            purl: Some(purl),
            external_references: self.external_references.clone(),
            properties: self.properties.clone(),
            extra: Map::new(),
        }
    }

    /// Reference used in dependency edges: bom-ref, else purl.
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.bom_ref.as_deref().or(self.purl.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalReference {
    #[serde(rename = "type")]
    pub ref_type: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Dependency edge list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    #[serde(rename = "ref")]
    pub ref_field: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dependency {
    pub fn new(ref_field: impl Into<String>) -> Self {
        Self {
            ref_field: ref_field.into(),
            depends_on: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl Bom {
    /// The root (main) component from metadata.
    #[must_use]
    pub fn root_component(&self) -> Option<&Component> {
        self.metadata.as_ref().and_then(|m| m.component.as_ref())
    }

    /// Reference of the root component.
    #[must_use]
    pub fn root_ref(&self) -> Option<&str> {
        self.root_component().and_then(Component::reference)
    }

    /// Mutable edge list entry for `reference`, created if absent.
    pub fn dependency_entry(&mut self, reference: &str) -> &mut Dependency {
        let deps = self.dependencies.get_or_insert_with(Vec::new);
        let pos = match deps.iter().position(|d| d.ref_field == reference) {
            Some(pos) => pos,
            None => {
                deps.push(Dependency::new(reference));
                deps.len() - 1
            }
        };
        &mut deps[pos]
    }

    /// Append `child` under `parent`'s edge list, skipping duplicates.
    pub fn add_edge(&mut self, parent: &str, child: &str) {
        let entry = self.dependency_entry(parent);
        if !entry.depends_on.iter().any(|d| d == child) {
            entry.depends_on.push(child.to_string());
        }
    }
}
