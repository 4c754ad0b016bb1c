//! Manifest format detection.
//!
//! Each manifest parser reports a confidence for the content; the most
//! confident parser at or above the threshold handles it.

use super::pom::PomParser;
use super::purl_list::PurlListParser;
use super::traits::{FormatConfidence, ManifestParser, ParseError};
use crate::model::DeclaredManifest;

/// Minimum confidence threshold for accepting a format detection.
pub const MIN_CONFIDENCE_THRESHOLD: f32 = 0.25;

/// Manifest kind identified during detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    Pom,
    PurlList,
}

impl ManifestKind {
    /// Get the human-readable name for this manifest kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pom => "Maven POM",
            Self::PurlList => "JSON coordinate list",
        }
    }
}

/// Result of format detection.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    pub kind: Option<ManifestKind>,
    pub confidence: FormatConfidence,
}

impl DetectionResult {
    /// Check if the detection is confident enough to parse.
    #[must_use]
    pub fn can_parse(&self) -> bool {
        self.kind.is_some() && self.confidence.value() >= MIN_CONFIDENCE_THRESHOLD
    }
}

/// Picks a manifest parser for content.
#[derive(Debug, Default)]
pub struct ManifestDetector {
    pom: PomParser,
    purl_list: PurlListParser,
}

impl ManifestDetector {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pom: PomParser::new(),
            purl_list: PurlListParser::new(),
        }
    }

    /// Detect the manifest format of `content`.
    #[must_use]
    pub fn detect(&self, content: &str) -> DetectionResult {
        let pom = self.pom.confidence(content);
        let list = self.purl_list.confidence(content);
        tracing::debug!(
            "Manifest detection: POM={:.2}, list={:.2}",
            pom.value(),
            list.value()
        );

        let (kind, confidence) = if pom >= list {
            (ManifestKind::Pom, pom)
        } else {
            (ManifestKind::PurlList, list)
        };
        DetectionResult {
            kind: confidence.can_parse().then_some(kind),
            confidence,
        }
    }

    /// Detect and parse in one step.
    pub fn parse_str(&self, content: &str) -> Result<DeclaredManifest, ParseError> {
        let detection = self.detect(content);
        match detection.kind {
            Some(ManifestKind::Pom) if detection.can_parse() => self.pom.parse_str(content),
            Some(ManifestKind::PurlList) if detection.can_parse() => {
                self.purl_list.parse_str(content)
            }
            _ => Err(ParseError::UnknownFormat(
                "expected a Maven POM or a JSON coordinate list".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_pom() {
        let detection = ManifestDetector::new()
            .detect("<?xml version=\"1.0\"?><project><modelVersion>4.0.0</modelVersion></project>");
        assert_eq!(detection.kind, Some(ManifestKind::Pom));
        assert!(detection.can_parse());
    }

    #[test]
    fn test_detect_purl_list() {
        let detection = ManifestDetector::new().detect(r#"["pkg:maven/g/a@1"]"#);
        assert_eq!(detection.kind, Some(ManifestKind::PurlList));
    }

    #[test]
    fn test_unknown_content() {
        let err = ManifestDetector::new().parse_str("plain text").unwrap_err();
        assert!(matches!(err, ParseError::UnknownFormat(_)));
    }
}
