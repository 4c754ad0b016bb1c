//! Configuration module for sbomgen.
//!
//! This module provides:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - YAML config file loading and discovery
//!
//! # Configuration File
//!
//! Place a `.sbomgen.yaml` file in your project root or `~/.config/sbomgen/`:
//!
//! ```yaml
//! intake:
//!   trigger: OPERATION
//! orchestrator:
//!   timeout: 4h
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    DEFAULT_ENHANCED_SUFFIX, DEFAULT_JOB_TIMEOUT, DEFAULT_SERVICE_ACCOUNT,
    DEFAULT_WORKSPACE_CLAIM,
};
pub use types::{
    AppConfig, AppConfigBuilder, GeneratorConfig, IntakeConfig, OrchestratorConfig,
    ReconcileConfig, TriggerMode,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_full_example_config, load_config_file, load_or_default,
    search_paths, ConfigFileError, CONFIG_FILE_NAMES,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// This schema documents all configuration options that can be set in
/// `.sbomgen.yaml` config files.
pub fn generate_json_schema() -> serde_json::Result<String> {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema)
}
