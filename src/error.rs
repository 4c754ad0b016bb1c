//! Unified error types for sbomgen.
//!
//! The hierarchy mirrors how failures are handled by the reconciliation
//! loop: configuration problems are fatal for a request, transient
//! platform problems are retried on the next pass, and data problems in
//! BOM reconciliation are scoped to a single item.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sbomgen operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SbomGenError {
    /// Errors while parsing documents (BOMs, manifests, request blobs)
    #[error("Failed to parse {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseErrorKind,
    },

    /// Request configuration is missing, unparseable, or does not match the request type
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The external generation tool reported a failure
    #[error("Generation tool failed: {message}")]
    ExternalToolFailure {
        message: String,
        exit_code: Option<i32>,
    },

    /// A job run exceeded its execution ceiling
    #[error("Job run '{name}' timed out after {seconds}s")]
    Timeout { name: String, seconds: u64 },

    /// Platform or store I/O failed; state is left unchanged and retried later
    #[error("Transient platform error: {0}")]
    Transient(String),

    /// Data inconsistency between declared and generated artifacts
    #[error("Data inconsistency: {0}")]
    DataInconsistency(String),

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific parse error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Invalid YAML structure: {0}")]
    InvalidYaml(String),

    #[error("Invalid XML structure: {0}")]
    InvalidXml(String),

    #[error("Missing required field: {field} in {context}")]
    MissingField { field: String, context: String },

    #[error("Invalid field value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error("Malformed PURL: {purl} - {reason}")]
    InvalidPurl { purl: String, reason: String },

    #[error("Unrecognized document format")]
    UnknownFormat,
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for sbomgen operations
pub type Result<T> = std::result::Result<T, SbomGenError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl SbomGenError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseErrorKind) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create a parse error for missing field
    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::parse(
            "document",
            ParseErrorKind::MissingField {
                field: field.into(),
                context: context.into(),
            },
        )
    }

    /// Create a parse error for a malformed package URL
    pub fn invalid_purl(purl: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::parse(
            "package coordinate",
            ParseErrorKind::InvalidPurl {
                purl: purl.into(),
                reason: reason.into(),
            },
        )
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let message = format!("{source}");
        Self::Io {
            path: Some(path.into()),
            message,
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a transient platform error
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an external tool failure
    pub fn tool_failure(message: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self::ExternalToolFailure {
            message: message.into(),
            exit_code,
        }
    }

    /// Whether the reconciliation loop should retry on a later pass.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::Io { .. })
    }
}

// ============================================================================
// Conversion implementations
// ============================================================================

impl From<std::io::Error> for SbomGenError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for SbomGenError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse("JSON", ParseErrorKind::InvalidJson(err.to_string()))
    }
}

impl From<serde_yaml::Error> for SbomGenError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::parse("YAML", ParseErrorKind::InvalidYaml(err.to_string()))
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<SbomGenError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| add_context_to_error(e.into(), context.into()))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| add_context_to_error(e.into(), f().into()))
    }
}

fn add_context_to_error(err: SbomGenError, new_ctx: String) -> SbomGenError {
    match err {
        SbomGenError::Parse { context, source } => SbomGenError::Parse {
            context: chain_context(&new_ctx, &context),
            source,
        },
        SbomGenError::Configuration(msg) => {
            SbomGenError::Configuration(chain_context(&new_ctx, &msg))
        }
        SbomGenError::Transient(msg) => SbomGenError::Transient(chain_context(&new_ctx, &msg)),
        SbomGenError::DataInconsistency(msg) => {
            SbomGenError::DataInconsistency(chain_context(&new_ctx, &msg))
        }
        SbomGenError::Validation(msg) => SbomGenError::Validation(chain_context(&new_ctx, &msg)),
        SbomGenError::Io {
            path,
            message,
            source,
        } => SbomGenError::Io {
            path,
            message: chain_context(&new_ctx, &message),
            source,
        },
        other => other,
    }
}

fn chain_context(new_ctx: &str, existing: &str) -> String {
    if existing.is_empty() {
        new_ctx.to_string()
    } else {
        format!("{new_ctx}: {existing}")
    }
}

/// Extension for `Option` types to convert to errors with context
pub trait OptionContext<T> {
    /// Convert None to an error with the given context
    fn context_none(self, context: impl Into<String>) -> Result<T>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| SbomGenError::validation(context))
    }
}
