//! Page template registry.
//!
//! Templates are loaded once from configuration and handed to the
//! [`PageManager`](crate::PageManager) that owns the registry.

use std::collections::BTreeMap;

use arbor_config::TemplateConfig;
use serde::Serialize;

/// Page template definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Template {
    /// Registry key.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Template file path, interpreted by the renderer.
    pub path: String,
    /// Whether new pages use this template by default.
    pub default: bool,
}

impl Template {
    /// Create a template definition.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            path: path.into(),
            default: false,
        }
    }

    /// Mark this template as the default.
    #[must_use]
    pub fn with_default(mut self, default: bool) -> Self {
        self.default = default;
        self
    }
}

/// Template misconfiguration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// No registered template has `default = true`.
    #[error("No default template configured, mark one template with `default = true`")]
    NoDefaultTemplate,
    /// No template registered under the requested code.
    #[error("No template registered with code: {0}")]
    UnknownTemplate(String),
}

/// Mapping from template code to [`Template`].
///
/// Codes iterate in sorted order, so "first default" is deterministic.
/// Duplicate codes replace earlier entries. Multiple defaults are accepted.
#[derive(Clone, Debug, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, Template>,
}

impl TemplateRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the `[templates]` config section.
    #[must_use]
    pub fn from_config(config: &BTreeMap<String, TemplateConfig>) -> Self {
        let templates = config
            .iter()
            .map(|(code, t)| {
                (
                    code.clone(),
                    Template::new(code.as_str(), t.name.as_str(), t.path.as_str())
                        .with_default(t.default),
                )
            })
            .collect();
        Self { templates }
    }

    /// First template flagged as default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::NoDefaultTemplate`] if none is flagged.
    pub fn default_template(&self) -> Result<&Template, ConfigurationError> {
        self.templates
            .values()
            .find(|t| t.default)
            .ok_or(ConfigurationError::NoDefaultTemplate)
    }

    /// Template registered under `code`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownTemplate`] if `code` is absent.
    pub fn template(&self, code: &str) -> Result<&Template, ConfigurationError> {
        self.templates
            .get(code)
            .ok_or_else(|| ConfigurationError::UnknownTemplate(code.to_owned()))
    }

    /// Register `template` under `code`, replacing any existing entry.
    pub fn add_template(&mut self, code: impl Into<String>, template: Template) {
        self.templates.insert(code.into(), template);
    }

    /// Replace all templates.
    pub fn set_templates(&mut self, templates: BTreeMap<String, Template>) {
        self.templates = templates;
    }

    /// All templates keyed by code.
    #[must_use]
    pub fn templates(&self) -> &BTreeMap<String, Template> {
        &self.templates
    }
}
