//! CLI error types.

use arbor_config::ConfigError;
use arbor_pages::{ConfigurationError, PageError};
use arbor_store::StoreError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Page(#[from] PageError),

    #[error("{0}")]
    Template(#[from] ConfigurationError),

    #[error("{0}")]
    NotFound(String),
}
