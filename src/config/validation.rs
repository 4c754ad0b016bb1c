//! Configuration validation for sbomgen.

use super::types::{AppConfig, GeneratorConfig, OrchestratorConfig, ReconcileConfig};
use crate::utils::parse_duration;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.orchestrator.validate());
        errors.extend(self.generator.validate());
        errors.extend(self.reconcile.validate());
        errors
    }
}

impl Validatable for OrchestratorConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        match parse_duration(&self.timeout) {
            Ok(d) if d.is_zero() => {
                errors.push(ConfigError::new(
                    "orchestrator.timeout",
                    "must be greater than zero",
                ));
            }
            Ok(_) => {}
            Err(e) => errors.push(ConfigError::new("orchestrator.timeout", e.to_string())),
        }

        let required = [
            ("orchestrator.service_account", &self.service_account),
            ("orchestrator.workspace_claim", &self.workspace_claim),
            ("orchestrator.workspace_name", &self.workspace_name),
            (
                "orchestrator.operation_generate_task",
                &self.operation_generate_task,
            ),
            ("orchestrator.build_generate_task", &self.build_generate_task),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                errors.push(ConfigError::new(field, "must not be empty"));
            }
        }

        errors
    }
}

impl Validatable for GeneratorConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.command.is_empty() {
            errors.push(ConfigError::new(
                "generator.command",
                "must name a program to run",
            ));
        } else if !self.command.iter().any(|arg| arg.contains("{pom}")) {
            errors.push(ConfigError::new(
                "generator.command",
                "must reference the manifest via {pom}",
            ));
        }
        if self.bom_path.trim().is_empty() {
            errors.push(ConfigError::new("generator.bom_path", "must not be empty"));
        }
        errors
    }
}

impl Validatable for ReconcileConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.enhanced_suffix.is_empty() {
            // An empty suffix would overwrite the raw BOM.
            errors.push(ConfigError::new(
                "reconcile.enhanced_suffix",
                "must not be empty",
            ));
        }
        if self.enhanced_suffix.contains(['/', '\\']) {
            errors.push(ConfigError::new(
                "reconcile.enhanced_suffix",
                "must not contain path separators",
            ));
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().is_valid());
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = AppConfig::default();
        config.orchestrator.timeout = "six hours".to_string();
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "orchestrator.timeout");
    }

    #[test]
    fn test_zero_timeout() {
        let mut config = OrchestratorConfig::default();
        config.timeout = "0s".to_string();
        assert!(!config.is_valid());
    }

    #[test]
    fn test_empty_suffix_rejected() {
        let config = ReconcileConfig {
            enhanced_suffix: String::new(),
        };
        assert!(!config.is_valid());
    }

    #[test]
    fn test_generator_requires_pom_placeholder() {
        let config = GeneratorConfig {
            command: vec!["true".to_string()],
            ..GeneratorConfig::default()
        };
        let errors = config.validate();
        assert!(errors[0].message.contains("{pom}"));
    }
}
