use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Fallback base URL for the pact collection API.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Number of pacts requested per list call.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Largest page size the server accepts.
pub const MAX_PAGE_SIZE: u32 = 500;

const ENV_PREFIX: &str = "PACT";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory the configuration file lives in
    #[serde(skip)]
    pub config_dir: PathBuf,

    /// Remote collection settings
    pub api: ApiConfig,

    /// Calendar view settings
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the pact collection API
    pub base_url: String,

    /// Fixed page size for every list request
    pub page_size: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Base URL to use, falling back to the built-in default when blank.
    pub fn base_url(&self) -> &str {
        let trimmed = self.base_url.trim();
        if trimmed.is_empty() {
            DEFAULT_API_BASE_URL
        } else {
            trimmed
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Mark every day with an activity dot, whether or not it has pacts
    pub baseline_activity: bool,

    /// Fixed UTC offset used to assign pacts to days. Local zone when unset.
    pub utc_offset_minutes: Option<i32>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            baseline_activity: true,
            utc_offset_minutes: None,
        }
    }
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pact")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            api: ApiConfig::default(),
            calendar: CalendarConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the user config directory, creating the
    /// default file if it doesn't exist.
    ///
    /// `PACT_*` environment variables override file values, using `__` for
    /// nesting (`PACT_API__BASE_URL`).
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            if let Err(e) = Self::default().save_to(&config_path) {
                tracing::warn!("Could not write default config: {:#}", e);
            }
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read config sources")?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if let Some(parent) = path.parent() {
            config.config_dir = parent.to_path_buf();
        }

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(self.api.base_url(), "api.base_url", &mut result);

        if self.api.page_size == 0 {
            result.add_error("api.page_size", "Page size must be greater than 0");
        } else if self.api.page_size > MAX_PAGE_SIZE {
            result.add_error(
                "api.page_size",
                format!("Page size cannot exceed {}", MAX_PAGE_SIZE),
            );
        }

        if self.api.timeout_secs == 0 {
            result.add_warning("api.timeout_secs", "Request timeout disabled (0 seconds)");
        }

        if let Some(offset) = self.calendar.utc_offset_minutes {
            if offset.abs() >= 24 * 60 {
                result.add_error(
                    "calendar.utc_offset_minutes",
                    "Offset must be within +/-24 hours",
                );
            }
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("pact");

        Ok(config_dir.join(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
        assert_eq!(config.api.base_url(), DEFAULT_API_BASE_URL);
        assert!(config.calendar.baseline_activity);
    }

    #[test]
    fn test_blank_base_url_falls_back() {
        let mut config = Config::default();
        config.api.base_url = "   ".to_string();
        assert_eq!(config.api.base_url(), DEFAULT_API_BASE_URL);
        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.api.base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "api.base_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.api.base_url = "ftp://localhost:8000".to_string();
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_page_size_bounds() {
        let mut config = Config::default();
        config.api.page_size = 0;
        assert!(!config.validate().is_valid());

        config.api.page_size = MAX_PAGE_SIZE + 1;
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "api.page_size"));

        config.api.page_size = MAX_PAGE_SIZE;
        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_utc_offset_out_of_range() {
        let mut config = Config::default();
        config.calendar.utc_offset_minutes = Some(24 * 60);
        assert!(!config.validate().is_valid());

        config.calendar.utc_offset_minutes = Some(-330);
        assert!(config.validate().is_valid());
    }

    #[test]
    fn test_zero_timeout_is_warning() {
        let mut config = Config::default();
        config.api.timeout_secs = 0;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "api.timeout_secs"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pact").join(CONFIG_FILE_NAME);

        let mut config = Config::default();
        config.api.base_url = "https://pacts.example.com".to_string();
        config.api.page_size = 50;
        config.calendar.baseline_activity = false;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api.base_url, "https://pacts.example.com");
        assert_eq!(loaded.api.page_size, 50);
        assert!(!loaded.calendar.baseline_activity);
        assert_eq!(loaded.config_dir, dir.path().join("pact"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[calendar]\nutc_offset_minutes = 60\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.calendar.utc_offset_minutes, Some(60));
        assert!(loaded.calendar.baseline_activity);
        assert_eq!(loaded.api.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.api.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\npage_size = \"lots\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
