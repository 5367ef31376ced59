//! Exception library properties.
//!
//! Enable flags and priority overrides per analyzer, consumed when the
//! registries are built. Properties load from a TOML file with environment
//! variable overrides.

use config::{Config, ConfigError as SourceError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::analyzers::database::DEFAULT_TIMEOUT_THRESHOLD_MS;
use crate::analyzers::{DATABASE_PRIORITY, TEST_CONTEXT_PRIORITY, TEST_EXECUTION_PRIORITY};

/// Default priority of the startup failure reporter.
pub const STARTUP_PRIORITY: i32 = 1000;

/// Errors that can occur when loading exception properties.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// The configuration could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(#[from] SourceError),

    /// A TOML string could not be parsed.
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// The configuration file path is invalid.
    #[error("invalid configuration path: {0}")]
    InvalidPath(String),
}

fn default_true() -> bool {
    true
}

fn default_startup_priority() -> i32 {
    STARTUP_PRIORITY
}

fn default_database_priority() -> i32 {
    DATABASE_PRIORITY
}

fn default_test_priority() -> i32 {
    TEST_EXECUTION_PRIORITY
}

fn default_test_context_priority() -> i32 {
    TEST_CONTEXT_PRIORITY
}

fn default_timeout_threshold() -> u64 {
    DEFAULT_TIMEOUT_THRESHOLD_MS
}

/// Startup failure reporter settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StartupAnalyzerProperties {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_startup_priority")]
    pub priority: i32,
}

impl Default for StartupAnalyzerProperties {
    fn default() -> Self {
        Self {
            enabled: true,
            priority: STARTUP_PRIORITY,
        }
    }
}

/// Database analyzer settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseAnalyzerProperties {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_database_priority")]
    pub priority: i32,
    /// Reported with connection failures, in milliseconds.
    #[serde(default = "default_timeout_threshold")]
    pub timeout_threshold_ms: u64,
}

impl Default for DatabaseAnalyzerProperties {
    fn default() -> Self {
        Self {
            enabled: true,
            priority: DATABASE_PRIORITY,
            timeout_threshold_ms: DEFAULT_TIMEOUT_THRESHOLD_MS,
        }
    }
}

/// Test execution analyzer settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TestAnalyzerProperties {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_test_priority")]
    pub priority: i32,
    #[serde(default = "default_true")]
    pub include_stack_trace: bool,
}

impl Default for TestAnalyzerProperties {
    fn default() -> Self {
        Self {
            enabled: true,
            priority: TEST_EXECUTION_PRIORITY,
            include_stack_trace: true,
        }
    }
}

/// Test context analyzer settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TestContextAnalyzerProperties {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_test_context_priority")]
    pub priority: i32,
    #[serde(default = "default_true")]
    pub show_context_details: bool,
}

impl Default for TestContextAnalyzerProperties {
    fn default() -> Self {
        Self {
            enabled: true,
            priority: TEST_CONTEXT_PRIORITY,
            show_context_details: true,
        }
    }
}

/// Response payload settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseProperties {
    /// Active deployment profiles, e.g. `["dev"]`.
    #[serde(default)]
    pub active_profiles: Vec<String>,
}

/// Root exception library properties.
#[derive(Debug, Clone, Deserialize)]
pub struct ExceptionProperties {
    /// Master switch. When false no analyzer is registered.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub startup_analyzer: StartupAnalyzerProperties,
    #[serde(default)]
    pub database_analyzer: DatabaseAnalyzerProperties,
    #[serde(default)]
    pub test_analyzer: TestAnalyzerProperties,
    #[serde(default)]
    pub test_context_analyzer: TestContextAnalyzerProperties,
    #[serde(default)]
    pub response: ResponseProperties,
}

impl Default for ExceptionProperties {
    fn default() -> Self {
        Self {
            enabled: true,
            startup_analyzer: StartupAnalyzerProperties::default(),
            database_analyzer: DatabaseAnalyzerProperties::default(),
            test_analyzer: TestAnalyzerProperties::default(),
            test_context_analyzer: TestContextAnalyzerProperties::default(),
            response: ResponseProperties::default(),
        }
    }
}

impl ExceptionProperties {
    /// Load properties from a TOML file.
    ///
    /// # Environment Variable Overrides
    ///
    /// Values can be overridden with `FAULTLENS__<SECTION>__<KEY>`, e.g.
    /// `FAULTLENS__DATABASE_ANALYZER__PRIORITY=10`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be parsed, or the
    /// path is not valid UTF-8.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let path_str = path
            .to_str()
            .ok_or_else(|| ConfigError::InvalidPath(format!("{:?}", path)))?;

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path_str.to_string()));
        }

        let config = Config::builder()
            .add_source(File::from(path))
            .add_source(environment())
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Defaults overridden by `FAULTLENS__` environment variables only.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Config::builder().add_source(environment()).build()?;
        Ok(config.try_deserialize()?)
    }

    /// Parse properties from a TOML string. Environment variables are not consulted.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }
}

/// `FAULTLENS__<SECTION>__<KEY>` variables. List values are comma separated.
fn environment() -> Environment {
    Environment::with_prefix("FAULTLENS")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("response.active_profiles")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let properties = ExceptionProperties::default();
        assert!(properties.enabled);
        assert!(properties.startup_analyzer.enabled);
        assert_eq!(properties.startup_analyzer.priority, 1000);
        assert_eq!(properties.database_analyzer.priority, 100);
        assert_eq!(properties.database_analyzer.timeout_threshold_ms, 30_000);
        assert_eq!(properties.test_analyzer.priority, 75);
        assert!(properties.test_analyzer.include_stack_trace);
        assert_eq!(properties.test_context_analyzer.priority, 80);
        assert!(properties.test_context_analyzer.show_context_details);
        assert!(properties.response.active_profiles.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml_str = r#"
            [database_analyzer]
            priority = 10

            [test_analyzer]
            enabled = false

            [response]
            active_profiles = ["dev"]
        "#;

        let properties = ExceptionProperties::from_toml_str(toml_str).unwrap();
        assert!(properties.enabled);
        assert_eq!(properties.database_analyzer.priority, 10);
        assert!(properties.database_analyzer.enabled);
        assert_eq!(properties.database_analyzer.timeout_threshold_ms, 30_000);
        assert!(!properties.test_analyzer.enabled);
        assert_eq!(properties.test_analyzer.priority, 75);
        assert_eq!(properties.response.active_profiles, vec!["dev"]);
    }

    #[test]
    fn test_invalid_toml() {
        let result = ExceptionProperties::from_toml_str("enabled = \"maybe\"");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_load_file_not_found() {
        let result = ExceptionProperties::load("nonexistent/path/faultlens.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "enabled = true\n\n[test_context_analyzer]\npriority = 5\nshow_context_details = false"
        )
        .unwrap();

        let properties = ExceptionProperties::load(file.path()).unwrap();
        assert_eq!(properties.test_context_analyzer.priority, 5);
        assert!(!properties.test_context_analyzer.show_context_details);
        assert_eq!(properties.database_analyzer.priority, 100);
    }

    #[test]
    fn test_env_active_profiles_list() {
        std::env::set_var("FAULTLENS__RESPONSE__ACTIVE_PROFILES", "dev,local");
        let result = ExceptionProperties::from_env();
        std::env::remove_var("FAULTLENS__RESPONSE__ACTIVE_PROFILES");

        let properties = result.unwrap();
        assert_eq!(properties.response.active_profiles, vec!["dev", "local"]);
        assert_eq!(properties.database_analyzer.priority, 100);
    }

    #[test]
    fn test_error_display() {
        let err = ConfigError::FileNotFound("faultlens.toml".to_string());
        assert_eq!(err.to_string(), "configuration file not found: faultlens.toml");

        let err = ConfigError::InvalidPath("bad/path".to_string());
        assert_eq!(err.to_string(), "invalid configuration path: bad/path");
    }
}
