//! Configuration for research runs.
//!
//! A run is described by a YAML file. `${VAR}` and `${VAR:-default}`
//! references are replaced from the environment before parsing, and the
//! parsed config is validated before use.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ma_research::config::load_config;
//!
//! let config = load_config("configs/baseline.yaml")?;
//! println!("grid: {:?}", config.search.coarse_grid);
//! ```
//!
//! # Example
//!
//! ```yaml
//! run_name: baseline
//! feature_file: ${DATA_DIR:-data}/features/AAPL_feat.csv
//! search:
//!   coarse_grid: [10, 20, 50, 100, 200]
//!   refine: { radius: 20, stride: 5, lower_bound: 5, upper_bound: 250 }
//! selection:
//!   drawdown_floor: -0.30
//!   policy: fallback_to_all
//! ```

mod observability;
mod research;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use observability::{LogFormat, LoggingConfig, ObservabilityConfig};
pub use research::{SearchSection, SelectionSection};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration of one research run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Run label, carried into the report.
    pub run_name: String,

    /// Feature CSV to research. May be overridden on the command line.
    #[serde(default)]
    pub feature_file: Option<String>,

    /// Parameter search settings.
    #[serde(default)]
    pub search: SearchSection,

    /// Selection settings.
    #[serde(default)]
    pub selection: SelectionSection,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl ResearchConfig {
    /// Config with defaults for everything except the run name.
    #[must_use]
    pub fn named(run_name: impl Into<String>) -> Self {
        Self {
            run_name: run_name.into(),
            feature_file: None,
            search: SearchSection::default(),
            selection: SelectionSection::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: impl AsRef<Path>) -> Result<ResearchConfig, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<ResearchConfig, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: ResearchConfig = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax. Unset variables
/// without a default become empty.
#[allow(clippy::expect_used)] // Regex is a compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;
    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &ResearchConfig) -> Result<(), ConfigError> {
    if config.run_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "run_name must not be empty".to_string(),
        ));
    }

    if config.feature_file.as_deref().is_some_and(|f| f.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "feature_file must not be empty when set".to_string(),
        ));
    }

    config
        .search
        .grid()
        .map_err(|e| ConfigError::ValidationError(format!("search.coarse_grid: {e}")))?;
    config
        .search
        .refine
        .validate()
        .map_err(|e| ConfigError::ValidationError(format!("search.refine: {e}")))?;

    let floor = config.selection.drawdown_floor;
    if !floor.is_finite() || floor > 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "selection.drawdown_floor must be a finite value <= 0, got {floor}"
        )));
    }

    if config.observability.logging.level.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "observability.logging.level must not be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::search::RefineSpec;
    use crate::selection::SelectionPolicy;

    #[test]
    fn test_load_minimal_config() {
        let yaml = "run_name: baseline\n";
        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load minimal config: {e}"),
        };

        assert_eq!(config, ResearchConfig::named("baseline"));
        assert_eq!(config.search.coarse_grid, vec![10, 20, 50, 100, 200]);
        assert_eq!(config.search.refine, RefineSpec::default());
        assert!((config.selection.drawdown_floor + 0.30).abs() < f64::EPSILON);
        assert_eq!(config.selection.policy, SelectionPolicy::FallbackToAll);
        assert_eq!(config.observability.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_load_full_config() {
        let yaml = r"
run_name: tuned
feature_file: data/features/SPY_feat.csv
search:
  coarse_grid: [5, 15, 45]
  refine:
    radius: 10
    stride: 2
    lower_bound: 3
    upper_bound: 60
  parallel: false
  min_parallel_jobs: 8
selection:
  drawdown_floor: -0.2
  policy: strict
observability:
  logging:
    level: debug
    format: json
";
        let config = match load_config_from_string(yaml) {
            Ok(c) => c,
            Err(e) => panic!("should load full config: {e}"),
        };

        assert_eq!(config.feature_file.as_deref(), Some("data/features/SPY_feat.csv"));
        assert_eq!(config.search.coarse_grid, vec![5, 15, 45]);
        let search = config.search.search_config();
        assert_eq!(search.refine.stride, 2);
        assert!(!search.parallel);
        assert_eq!(search.min_parallel_jobs, 8);
        assert_eq!(config.selection.policy, SelectionPolicy::Strict);
        assert_eq!(config.observability.logging.level, "debug");
        assert_eq!(config.observability.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_windows_alias() {
        let yaml = "run_name: legacy\nsearch:\n  windows: [10, 30]\n";
        let Ok(config) = load_config_from_string(yaml) else {
            panic!("alias should be accepted");
        };
        assert_eq!(config.search.coarse_grid, vec![10, 30]);
    }

    #[test]
    fn test_env_var_with_default_when_missing() {
        let input = "feature_file: ${MA_RESEARCH_TEST_NONEXISTENT_VAR:-data/x.csv}";
        assert_eq!(interpolate_env_vars(input), "feature_file: data/x.csv");
    }

    #[test]
    #[expect(clippy::literal_string_with_formatting_args)] // ${...} is env var syntax
    fn test_env_var_with_default_uses_existing() {
        let input = "path: ${PATH:-default}";
        let result = interpolate_env_vars(input);
        assert_ne!(result, "path: default");
        assert!(result.starts_with("path: "));
    }

    #[test]
    fn test_env_var_without_default_becomes_empty() {
        let input = "run_name: ${MA_RESEARCH_TEST_UNLIKELY_TO_EXIST}";
        assert_eq!(interpolate_env_vars(input), "run_name: ");
    }

    #[test]
    fn test_validation_unsorted_grid() {
        let yaml = "run_name: bad\nsearch:\n  coarse_grid: [50, 20]\n";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for descending grid");
        };
        assert!(err.to_string().contains("coarse_grid"));
    }

    #[test]
    fn test_validation_positive_floor() {
        let yaml = "run_name: bad\nselection:\n  drawdown_floor: 0.1\n";
        let Err(err) = load_config_from_string(yaml) else {
            panic!("expected error for positive floor");
        };
        assert!(err.to_string().contains("drawdown_floor"));
    }

    #[test]
    fn test_validation_zero_stride() {
        let yaml = "run_name: bad\nsearch:\n  refine:\n    stride: 0\n";
        let result = load_config_from_string(yaml);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validation_empty_run_name() {
        let result = load_config_from_string("run_name: \"  \"\n");
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = match tempfile::NamedTempFile::new() {
            Ok(f) => f,
            Err(e) => panic!("temp file: {e}"),
        };
        if let Err(e) = file.write_all(b"run_name: from_file\n") {
            panic!("write temp file: {e}");
        }

        let Ok(config) = load_config(file.path()) else {
            panic!("should load from file");
        };
        assert_eq!(config.run_name, "from_file");
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("/nonexistent/config.yaml");
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }
}
