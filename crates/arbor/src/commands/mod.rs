//! CLI command implementations.

pub(crate) mod create;
pub(crate) mod pages;
pub(crate) mod templates;

use std::path::PathBuf;
use std::sync::Arc;

use arbor_config::{CliSettings, Config};
use arbor_pages::{PageManager, TemplateRegistry};
use arbor_store::SqliteRepository;
use clap::Args;

use crate::error::CliError;

pub(crate) use create::CreateArgs;
pub(crate) use pages::{FindArgs, ShowArgs, fix_urls, hybrid, tree};
pub(crate) use templates::templates;

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct GlobalArgs {
    /// Path to configuration file (default: auto-discover arbor.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database URL (overrides config).
    #[arg(long, global = true, env = "ARBOR_DATABASE_URL")]
    database: Option<String>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Load configuration with CLI overrides applied.
    pub(crate) fn load_config(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            database_url: self.database.clone(),
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }

    /// Open the configured database and build a page manager over it.
    pub(crate) fn page_manager(&self) -> Result<PageManager, CliError> {
        let config = self.load_config()?;
        tracing::info!(url = %config.database_resolved.url, "Opening page database");

        let repository = SqliteRepository::connect(&config.database_resolved.url)?;
        let templates = TemplateRegistry::from_config(&config.templates);

        Ok(PageManager::new(Arc::new(repository), templates))
    }
}
