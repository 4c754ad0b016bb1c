//! CycloneDX JSON BOM reader and writer.
//!
//! Generators emit JSON; only that form is read. Unknown fields survive a
//! read/write cycle through the `extra` maps on the model.

use crate::model::Bom;
use crate::parsers::traits::{FormatConfidence, ParseError};
use std::path::Path;

/// Maximum BOM file size (512 MB).
const MAX_BOM_FILE_SIZE: u64 = 512 * 1024 * 1024;

/// Reader/writer for CycloneDX JSON documents
#[derive(Debug, Default, Clone, Copy)]
pub struct CycloneDxParser {
    /// Reject documents that do not declare `bomFormat: CycloneDX`
    strict: bool,
}

impl CycloneDxParser {
    /// Create a new CycloneDX parser
    #[must_use]
    pub const fn new() -> Self {
        Self { strict: false }
    }

    /// Create a strict parser that requires the `bomFormat` marker
    #[must_use]
    pub const fn strict() -> Self {
        Self { strict: true }
    }

    /// Parse a BOM from JSON content
    pub fn parse_str(&self, content: &str) -> Result<Bom, ParseError> {
        if self.strict && !content.contains("\"bomFormat\"") {
            return Err(ParseError::UnknownFormat(
                "missing bomFormat marker".to_string(),
            ));
        }
        let bom: Bom = serde_json::from_str(content)?;
        if bom.bom_format != "CycloneDX" {
            return Err(ParseError::InvalidStructure(format!(
                "unexpected bomFormat '{}'",
                bom.bom_format
            )));
        }
        tracing::debug!(
            "Parsed CycloneDX {} BOM with {} components",
            bom.spec_version,
            bom.components.len()
        );
        Ok(bom)
    }

    /// Parse a BOM from a file
    pub fn parse_file(&self, path: &Path) -> Result<Bom, ParseError> {
        let metadata = std::fs::metadata(path)?;
        if metadata.len() > MAX_BOM_FILE_SIZE {
            return Err(ParseError::IoError(format!(
                "BOM file is {} MB, exceeding the {} MB limit",
                metadata.len() / (1024 * 1024),
                MAX_BOM_FILE_SIZE / (1024 * 1024),
            )));
        }
        let content = std::fs::read_to_string(path)?;
        self.parse_str(&content)
    }

    /// Structural check without full parsing
    #[must_use]
    pub fn confidence(&self, content: &str) -> FormatConfidence {
        let trimmed = content.trim_start();
        if !trimmed.starts_with('{') {
            return FormatConfidence::NONE;
        }
        if trimmed.contains("\"bomFormat\"") && trimmed.contains("CycloneDX") {
            FormatConfidence::HIGH
        } else if trimmed.contains("\"components\"") {
            FormatConfidence::LOW
        } else {
            FormatConfidence::NONE
        }
    }
}

/// Render a BOM as pretty-printed JSON.
pub fn write_bom(bom: &Bom) -> Result<String, ParseError> {
    Ok(serde_json::to_string_pretty(bom)?)
}

/// Write a BOM to `path`, creating parent directories.
pub fn write_bom_file(bom: &Bom, path: &Path) -> Result<(), ParseError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, write_bom(bom)?)?;
    tracing::info!("Wrote BOM to {}", path.display());
    Ok(())
}
