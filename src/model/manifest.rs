//! Declared dependency manifests and the analysed artifacts they are built from.

use super::coordinate::PackageCoordinate;
use serde::{Deserialize, Serialize};

/// Dependencies a deliverable declares, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredManifest {
    /// Coordinate of the manifest itself, if it names one
    pub root: Option<PackageCoordinate>,
    pub dependencies: Vec<PackageCoordinate>,
}

impl DeclaredManifest {
    #[must_use]
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

/// An artifact found while analysing a deliverable archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedArtifact {
    /// Identifier in the analysis system
    pub id: String,
    pub purl: String,
    /// Locations inside the deliverable where the artifact was found
    #[serde(default)]
    pub archive_filenames: Vec<String>,
    /// Archive the artifact was found in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution_url: Option<String>,
}

impl AnalyzedArtifact {
    /// Whether the artifact was found at least once outside of another jar.
    #[must_use]
    pub fn has_top_level_location(&self) -> bool {
        self.archive_filenames
            .iter()
            .any(|f| !f.contains(".jar!/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_only_artifact() {
        let artifact = AnalyzedArtifact {
            id: "1".to_string(),
            purl: "pkg:maven/g/a@1".to_string(),
            archive_filenames: vec!["app/lib/outer.jar!/lib/inner.jar".to_string()],
            distribution_url: None,
        };
        assert!(!artifact.has_top_level_location());
    }

    #[test]
    fn test_mixed_locations() {
        let artifact = AnalyzedArtifact {
            id: "1".to_string(),
            purl: "pkg:maven/g/a@1".to_string(),
            archive_filenames: vec![
                "app/lib/outer.jar!/lib/inner.jar".to_string(),
                "app/lib/inner.jar".to_string(),
            ],
            distribution_url: None,
        };
        assert!(artifact.has_top_level_location());
    }
}
