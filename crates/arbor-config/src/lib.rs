//! Configuration management for Arbor.
//!
//! Parses `arbor.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `database.url`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override database URL.
    pub database_url: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "arbor.toml";

/// Database filename used when no URL is configured.
const DEFAULT_DATABASE_FILE: &str = "arbor.db";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration (URL as written in TOML).
    database: DatabaseConfigRaw,
    /// Page template definitions keyed by template code.
    pub templates: BTreeMap<String, TemplateConfig>,

    /// Resolved database configuration (set after loading).
    #[serde(skip)]
    pub database_resolved: DatabaseConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw database configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DatabaseConfigRaw {
    url: Option<String>,
}

/// Resolved database configuration.
#[derive(Debug, Default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL (e.g., `sqlite:///srv/arbor/arbor.db`).
    pub url: String,
}

/// Page template definition.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct TemplateConfig {
    /// Display name.
    pub name: String,
    /// Template file path, interpreted by the renderer.
    pub path: String,
    /// Whether this is the default template for new pages.
    #[serde(default)]
    pub default: bool,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`database.url`").
        field: String,
        /// Error message (e.g., "${`ARBOR_DB`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `arbor.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(url) = &settings.database_url {
            self.database_resolved.url.clone_from(url);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with the database next to `base`.
    fn default_with_base(base: &Path) -> Self {
        Self {
            database: DatabaseConfigRaw::default(),
            templates: BTreeMap::new(),
            database_resolved: DatabaseConfig {
                url: default_database_url(base),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_database()?;
        self.validate_templates()?;
        Ok(())
    }

    fn validate_database(&self) -> Result<(), ConfigError> {
        let url = &self.database_resolved.url;
        require_non_empty(url, "database.url")?;
        if !url.starts_with("sqlite:") {
            return Err(ConfigError::Validation(
                "database.url must start with sqlite:".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_templates(&self) -> Result<(), ConfigError> {
        for (code, template) in &self.templates {
            require_non_empty(code, "templates.<code>")?;
            require_non_empty(&template.name, &format!("templates.{code}.name"))?;
            require_non_empty(&template.path, &format!("templates.{code}.path"))?;
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref url) = self.database.url {
            self.database.url = Some(expand::expand_env(url, "database.url")?);
        }
        Ok(())
    }

    /// Resolve raw values against the config directory.
    fn resolve(&mut self, config_dir: &Path) {
        self.database_resolved = DatabaseConfig {
            url: self
                .database
                .url
                .clone()
                .unwrap_or_else(|| default_database_url(config_dir)),
        };
    }
}

fn default_database_url(base: &Path) -> String {
    format!("sqlite://{}", base.join(DEFAULT_DATABASE_FILE).display())
}
