//! JSON manifests: a list of package-URLs or coordinate objects.
//!
//! Accepted shapes:
//! - `["pkg:maven/g/a@1", ...]`
//! - `[{"group": "g", "name": "a", "version": "1", "type": "jar", "classifier": "x"}, ...]`
//! - either of the above under a top-level `"dependencies"` key

use super::traits::{FormatConfidence, ManifestParser, ParseError};
use crate::model::{DeclaredManifest, PackageCoordinate};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Document {
    List(Vec<Entry>),
    Wrapped {
        #[serde(default)]
        root: Option<Entry>,
        dependencies: Vec<Entry>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Entry {
    Purl(String),
    Object(CoordinateEntry),
}

#[derive(Debug, Deserialize)]
struct CoordinateEntry {
    #[serde(alias = "groupId")]
    group: String,
    #[serde(alias = "artifactId")]
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default, rename = "type")]
    packaging: Option<String>,
    #[serde(default)]
    classifier: Option<String>,
}

impl Entry {
    fn into_coordinate(self, position: usize) -> Result<PackageCoordinate, ParseError> {
        match self {
            Self::Purl(purl) => PackageCoordinate::parse(&purl).map_err(|e| {
                ParseError::InvalidStructure(format!("entry {position}: {e}"))
            }),
            Self::Object(entry) => Ok(PackageCoordinate::maven(
                entry.group,
                entry.name,
                entry.version,
                entry.packaging.as_deref(),
                entry.classifier.as_deref(),
            )),
        }
    }
}

/// Parser for JSON coordinate lists.
#[derive(Debug, Default, Clone, Copy)]
pub struct PurlListParser;

impl PurlListParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ManifestParser for PurlListParser {
    fn parse_str(&self, content: &str) -> Result<DeclaredManifest, ParseError> {
        let document: Document = serde_json::from_str(content)?;
        let (root, entries) = match document {
            Document::List(entries) => (None, entries),
            Document::Wrapped { root, dependencies } => (root, dependencies),
        };
        let root = root.map(|r| r.into_coordinate(0)).transpose()?;
        let dependencies = entries
            .into_iter()
            .enumerate()
            .map(|(i, e)| e.into_coordinate(i))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DeclaredManifest { root, dependencies })
    }

    fn format_name(&self) -> &str {
        "JSON coordinate list"
    }

    fn confidence(&self, content: &str) -> FormatConfidence {
        let trimmed = content.trim_start();
        match trimmed.chars().next() {
            Some('[') if trimmed.contains("pkg:") || trimmed.contains("\"group") => {
                FormatConfidence::HIGH
            }
            Some('[') => FormatConfidence::LOW,
            Some('{') if trimmed.contains("\"dependencies\"") && !trimmed.contains("bomFormat") => {
                FormatConfidence::MEDIUM
            }
            _ => FormatConfidence::NONE,
        }
    }
}
