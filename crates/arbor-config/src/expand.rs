//! Environment variable expansion for configuration strings.
//!
//! Supports `${VAR}` and `${VAR:-default}`. An unset variable without a
//! default is an error naming the config field it appeared in.

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// `field` is the dotted config path used in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}
