//! Configuration types for sbomgen operations.
//!
//! Provides structured configuration for intake, orchestration, the
//! in-job generator and BOM reconciliation.

use super::defaults::{
    DEFAULT_BUILD_GENERATE_TASK, DEFAULT_ENHANCED_SUFFIX,
    DEFAULT_JOB_TIMEOUT, DEFAULT_OPERATION_GENERATE_TASK, DEFAULT_OUTPUT_ROOT,
    DEFAULT_SERVICE_ACCOUNT, DEFAULT_WORKSPACE_CLAIM, DEFAULT_WORKSPACE_NAME,
};
use crate::error::Result;
use crate::utils::parse_duration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Event intake settings
    pub intake: IntakeConfig,
    /// Job run materialization and reconciliation settings
    pub orchestrator: OrchestratorConfig,
    /// In-job generator settings
    pub generator: GeneratorConfig,
    /// BOM reconciliation settings
    pub reconcile: ReconcileConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the intake trigger mode.
    pub const fn trigger(mut self, trigger: TriggerMode) -> Self {
        self.config.intake.trigger = trigger;
        self
    }

    /// Set the per-job execution ceiling (e.g. `6h`, `30m`).
    pub fn job_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.config.orchestrator.timeout = timeout.into();
        self
    }

    /// Set the service account job runs execute as.
    pub fn service_account(mut self, account: impl Into<String>) -> Self {
        self.config.orchestrator.service_account = account.into();
        self
    }

    /// Set the persistent volume claim bound to the job workspace.
    pub fn workspace_claim(mut self, claim: impl Into<String>) -> Self {
        self.config.orchestrator.workspace_claim = claim.into();
        self
    }

    /// Set the suffix appended to reconciled BOM file stems.
    pub fn enhanced_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.reconcile.enhanced_suffix = suffix.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Intake
// ============================================================================

/// Which lifecycle notifications create generation requests.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
    clap::ValueEnum,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerMode {
    /// React to both build and operation notifications
    #[default]
    All,
    /// React to build notifications only
    Build,
    /// React to deliverable analysis notifications only
    Operation,
    /// Ignore every notification
    None,
}

impl TriggerMode {
    /// Whether build notifications are honoured.
    #[must_use]
    pub const fn accepts_builds(self) -> bool {
        matches!(self, Self::All | Self::Build)
    }

    /// Whether operation notifications are honoured.
    #[must_use]
    pub const fn accepts_operations(self) -> bool {
        matches!(self, Self::All | Self::Operation)
    }
}

impl std::fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::All => "ALL",
            Self::Build => "BUILD",
            Self::Operation => "OPERATION",
            Self::None => "NONE",
        };
        f.write_str(s)
    }
}

/// Event intake configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct IntakeConfig {
    /// Trigger mode; `NONE` disables request creation
    pub trigger: TriggerMode,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Settings applied to every materialized job run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Service account the job runs execute as
    pub service_account: String,
    /// Fixed execution ceiling per job run (e.g. `6h`)
    pub timeout: String,
    /// Persistent volume claim backing the shared workspace
    pub workspace_claim: String,
    /// Workspace binding name
    pub workspace_name: String,
    /// Task reference for per-deliverable operation generation
    pub operation_generate_task: String,
    /// Task reference for per-product build generation
    pub build_generate_task: String,
    /// Root of the shared workspace as mounted in job runs
    pub output_root: PathBuf,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            service_account: DEFAULT_SERVICE_ACCOUNT.to_string(),
            timeout: DEFAULT_JOB_TIMEOUT.to_string(),
            workspace_claim: DEFAULT_WORKSPACE_CLAIM.to_string(),
            workspace_name: DEFAULT_WORKSPACE_NAME.to_string(),
            operation_generate_task: DEFAULT_OPERATION_GENERATE_TASK.to_string(),
            build_generate_task: DEFAULT_BUILD_GENERATE_TASK.to_string(),
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
        }
    }
}

impl OrchestratorConfig {
    /// Parsed execution ceiling.
    pub fn timeout_duration(&self) -> Result<Duration> {
        parse_duration(&self.timeout)
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Settings for the generation command executed inside a job run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Program and arguments; `{pom}` and `{workdir}` are substituted
    pub command: Vec<String>,
    /// Location of the tool's raw BOM, relative to the deliverable work directory
    pub bom_path: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: [
                "mvn",
                "-B",
                "-q",
                "org.cyclonedx:cyclonedx-maven-plugin:2.7.9:makeAggregateBom",
                "-f",
                "{pom}",
                "-DoutputFormat=json",
                "-DoutputName=bom",
                "-DoutputDirectory={workdir}",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            bom_path: "bom.json".to_string(),
        }
    }
}

// ============================================================================
// BOM reconciliation
// ============================================================================

/// BOM reconciliation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Suffix appended to the raw BOM file stem for the reconciled artifact
    pub enhanced_suffix: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            enhanced_suffix: DEFAULT_ENHANCED_SUFFIX.to_string(),
        }
    }
}

impl ReconcileConfig {
    /// Path of the reconciled artifact written next to `raw`.
    #[must_use]
    pub fn enhanced_path(&self, raw: &std::path::Path) -> PathBuf {
        let stem = raw
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "bom".to_string());
        let ext = raw
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        raw.with_file_name(format!("{stem}{}{ext}", self.enhanced_suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_default_timeout_is_six_hours() {
        let config = OrchestratorConfig::default();
        assert_eq!(
            config.timeout_duration().unwrap(),
            Duration::from_secs(6 * 3600)
        );
    }

    #[test]
    fn test_trigger_mode_yaml() {
        let config: IntakeConfig = serde_yaml::from_str("trigger: NONE").unwrap();
        assert_eq!(config.trigger, TriggerMode::None);
        assert!(!config.trigger.accepts_builds());
        assert!(!config.trigger.accepts_operations());
        assert!(TriggerMode::Operation.accepts_operations());
        assert!(!TriggerMode::Operation.accepts_builds());
    }

    #[test]
    fn test_enhanced_path() {
        let config = ReconcileConfig::default();
        assert_eq!(
            config.enhanced_path(Path::new("/data/req/3/bom.json")),
            Path::new("/data/req/3/bom-enhanced.json")
        );
    }

    #[test]
    fn test_builder() {
        let config = AppConfig::builder()
            .trigger(TriggerMode::Build)
            .job_timeout("30m")
            .service_account("sbom-sa")
            .build();
        assert_eq!(config.intake.trigger, TriggerMode::Build);
        assert_eq!(config.orchestrator.timeout, "30m");
        assert_eq!(config.orchestrator.service_account, "sbom-sa");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: AppConfig = serde_yaml::from_str("orchestrator:\n  timeout: 2h\n").unwrap();
        assert_eq!(config.orchestrator.timeout, "2h");
        assert_eq!(config.orchestrator.workspace_claim, DEFAULT_WORKSPACE_CLAIM);
        assert_eq!(config.reconcile.enhanced_suffix, "-enhanced");
    }
}
