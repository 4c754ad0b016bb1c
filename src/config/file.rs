//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::AppConfig;
use super::validation::Validatable;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".sbomgen.yaml",
    ".sbomgen.yml",
    "sbomgen.yaml",
    "sbomgen.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/sbomgen/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd);
    }
    if let Some(git_root) = find_git_root() {
        candidates.push(git_root);
    }
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("sbomgen"));
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home);
    }

    candidates.iter().find_map(|dir| find_config_in_dir(dir))
}

/// Directories searched by [`discover_config_file`], in order.
#[must_use]
pub fn search_paths() -> Vec<PathBuf> {
    [
        std::env::current_dir().ok(),
        find_git_root(),
        dirs::config_dir().map(|p| p.join("sbomgen")),
        dirs::home_dir(),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();

    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml::Error),
    /// Parsed but failed validation
    Invalid(Vec<super::ConfigError>),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
            Self::Invalid(errors) => {
                let joined: Vec<String> = errors.iter().map(ToString::to_string).collect();
                write!(f, "Invalid config file: {}", joined.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) | Self::Invalid(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigFileError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err)
    }
}

/// Load and validate an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigFileError::Invalid(errors));
    }
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => {
                tracing::debug!("Loaded config from {}", path.display());
                (config, Some(path))
            }
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r#"# sbomgen configuration
# Place this file at .sbomgen.yaml in your project root or ~/.config/sbomgen/

# Event intake
intake:
  # ALL, BUILD, OPERATION or NONE (disables request creation)
  trigger: ALL

# Job run materialization
orchestrator:
  service_account: sbomer-sa
  # Fixed ceiling per job run: ms, s, m, h or d suffix
  timeout: 6h
  workspace_claim: sbomer-sboms
  workspace_name: data
  operation_generate_task: sbomer-operation-generate
  build_generate_task: sbomer-generate
  output_root: /data

# Command run inside each job run ({pom} and {workdir} are substituted)
generator:
  command: ["mvn", "-B", "-q", "org.cyclonedx:cyclonedx-maven-plugin:2.7.9:makeAggregateBom",
            "-f", "{pom}", "-DoutputFormat=json", "-DoutputName=bom", "-DoutputDirectory={workdir}"]
  bom_path: bom.json

# BOM reconciliation
reconcile:
  # The raw BOM is kept; the reconciled one is written as <stem><suffix>.json
  enhanced_suffix: -enhanced
"#
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_dir() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(".sbomgen.yaml");
        std::fs::write(&config_path, "intake:\n  trigger: BUILD\n").unwrap();

        assert_eq!(find_config_in_dir(tmp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_in_dir_not_found() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(find_config_in_dir(tmp.path()), None);
    }

    #[test]
    fn test_load_config_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sbomgen.yaml");
        std::fs::write(&path, "orchestrator:\n  timeout: 90m\n").unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.orchestrator.timeout, "90m");
    }

    #[test]
    fn test_load_config_file_missing() {
        let err = load_config_file(Path::new("/nonexistent/sbomgen.yaml")).unwrap_err();
        assert!(matches!(err, ConfigFileError::NotFound(_)));
    }

    #[test]
    fn test_load_config_file_invalid_value() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sbomgen.yaml");
        std::fs::write(&path, "orchestrator:\n  timeout: forever\n").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigFileError::Invalid(_)));
    }

    #[test]
    fn test_explicit_path_wins() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.yaml");
        std::fs::write(&path, "intake:\n  trigger: NONE\n").unwrap();

        assert_eq!(discover_config_file(Some(&path)), Some(path));
    }

    #[test]
    fn test_example_config_parses() {
        let config: AppConfig = serde_yaml::from_str(&generate_full_example_config()).unwrap();
        assert!(config.is_valid());
        assert_eq!(config, AppConfig::default());
    }
}
