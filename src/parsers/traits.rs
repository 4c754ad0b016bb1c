//! Parser trait definitions and error types.
//!
//! This module defines the `ManifestParser` trait for format-specific
//! manifest parsers and the confidence scoring used to pick one.

use crate::error::{ParseErrorKind, SbomGenError};
use crate::model::DeclaredManifest;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while parsing documents
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("JSON parse error: {0}")]
    JsonError(String),

    #[error("XML parse error: {0}")]
    XmlError(String),

    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    #[error("Unknown document format: {0}")]
    UnknownFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<quick_xml::DeError> for ParseError {
    fn from(err: quick_xml::DeError) -> Self {
        Self::XmlError(err.to_string())
    }
}

impl From<ParseError> for SbomGenError {
    fn from(err: ParseError) -> Self {
        let kind = match err {
            ParseError::IoError(msg) => {
                return Self::Io {
                    path: None,
                    message: msg.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, msg),
                }
            }
            ParseError::JsonError(msg) => ParseErrorKind::InvalidJson(msg),
            ParseError::XmlError(msg) => ParseErrorKind::InvalidXml(msg),
            ParseError::InvalidStructure(msg) => ParseErrorKind::InvalidValue {
                field: "document".to_string(),
                message: msg,
            },
            ParseError::UnknownFormat(_) => ParseErrorKind::UnknownFormat,
            ParseError::MissingField(field) => ParseErrorKind::MissingField {
                field,
                context: "document".to_string(),
            },
        };
        Self::parse("document", kind)
    }
}

/// Confidence level for format detection
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct FormatConfidence(f32);

impl FormatConfidence {
    /// No confidence - definitely not this format
    pub const NONE: Self = Self(0.0);
    /// Low confidence - might be this format
    pub const LOW: Self = Self(0.25);
    /// Medium confidence - likely this format
    pub const MEDIUM: Self = Self(0.5);
    /// High confidence - almost certainly this format
    pub const HIGH: Self = Self(0.75);

    #[must_use]
    pub const fn value(&self) -> f32 {
        self.0
    }

    /// Check if this confidence indicates the format can be parsed
    #[must_use]
    pub fn can_parse(&self) -> bool {
        self.0 >= Self::LOW.0
    }
}

/// Trait for dependency manifest parsers
pub trait ManifestParser {
    /// Parse a manifest from a file path
    fn parse(&self, path: &Path) -> Result<DeclaredManifest, ParseError> {
        let content = std::fs::read_to_string(path)?;
        self.parse_str(&content)
    }

    /// Parse a manifest from string content
    fn parse_str(&self, content: &str) -> Result<DeclaredManifest, ParseError>;

    /// Get format name
    fn format_name(&self) -> &str;

    /// Lightweight structural check without full parsing
    fn confidence(&self, content: &str) -> FormatConfidence;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_threshold() {
        assert!(!FormatConfidence::NONE.can_parse());
        assert!(FormatConfidence::LOW.can_parse());
        assert!(FormatConfidence::HIGH > FormatConfidence::MEDIUM);
    }

    #[test]
    fn test_parse_error_into_crate_error() {
        let err: SbomGenError = ParseError::XmlError("unclosed tag".to_string()).into();
        assert!(matches!(
            err,
            SbomGenError::Parse {
                source: ParseErrorKind::InvalidXml(_),
                ..
            }
        ));
    }
}
