//! Document parsers and writers.
//!
//! Two document families are handled:
//! - dependency manifests (Maven POM, JSON coordinate lists), read into a
//!   [`DeclaredManifest`]
//! - CycloneDX JSON BOMs, read into and written from [`Bom`](crate::model::Bom)
//!
//! ## Format Detection
//!
//! Manifest parsers report a confidence score (0.0-1.0) for content; the
//! parser with the highest confidence is selected.
//!
//! ## Usage
//!
//! ```no_run
//! use sbomgen::parsers::{parse_bom, parse_manifest};
//! use std::path::Path;
//!
//! let manifest = parse_manifest(Path::new("pom.xml")).unwrap();
//! let bom = parse_bom(Path::new("bom.json")).unwrap();
//! println!("{} declared, {} generated", manifest.len(), bom.components.len());
//! ```

mod cyclonedx;
mod detection;
mod pom;
mod purl_list;
mod traits;

pub use cyclonedx::{write_bom, write_bom_file, CycloneDxParser};
pub use detection::{DetectionResult, ManifestDetector, ManifestKind, MIN_CONFIDENCE_THRESHOLD};
pub use pom::{PomDependencies, PomDependency, PomModel, PomParser, POM_NAMESPACE};
pub use purl_list::PurlListParser;
pub use traits::{FormatConfidence, ManifestParser, ParseError};

use crate::model::{Bom, DeclaredManifest};
use std::path::Path;

/// Detect the manifest format of a file and parse it.
pub fn parse_manifest(path: &Path) -> Result<DeclaredManifest, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_manifest_str(&content)
}

/// Detect the manifest format of `content` and parse it.
pub fn parse_manifest_str(content: &str) -> Result<DeclaredManifest, ParseError> {
    ManifestDetector::new().parse_str(content)
}

/// Parse a CycloneDX JSON BOM file.
pub fn parse_bom(path: &Path) -> Result<Bom, ParseError> {
    CycloneDxParser::new().parse_file(path)
}

/// Parse CycloneDX JSON BOM content.
pub fn parse_bom_str(content: &str) -> Result<Bom, ParseError> {
    CycloneDxParser::new().parse_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest_str_dispatches() {
        let from_list = parse_manifest_str(r#"["pkg:maven/org.acme/lib@1.0"]"#).unwrap();
        let from_pom = parse_manifest_str(
            "<project><dependencies><dependency><groupId>org.acme</groupId>\
             <artifactId>lib</artifactId><version>1.0</version></dependency>\
             </dependencies></project>",
        )
        .unwrap();
        assert!(from_list.dependencies[0].matches_exactly(&from_pom.dependencies[0]));
    }
}
