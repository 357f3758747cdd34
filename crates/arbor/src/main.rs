//! Arbor CLI - page tree management.
//!
//! Provides commands for:
//! - `tree`: Print the page tree with URLs
//! - `show`: Show one page by route name or URL
//! - `hybrid`: List application-routed pages
//! - `find`: List pages matching field filters
//! - `create`: Create and save a page
//! - `fix-urls`: Recompute URLs for the whole tree
//! - `templates`: List configured templates

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CreateArgs, FindArgs, GlobalArgs, ShowArgs};
use output::Output;

/// Arbor - page tree management.
#[derive(Parser)]
#[command(name = "arbor", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the page tree.
    Tree,
    /// Show a page by route name or URL.
    Show(ShowArgs),
    /// List hybrid (application-routed) pages.
    Hybrid,
    /// List pages matching `field=value` filters.
    Find(FindArgs),
    /// Create a page and save it.
    Create(CreateArgs),
    /// Recompute slugs and URLs for every page tree.
    FixUrls,
    /// List configured templates.
    Templates,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.global.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Tree => commands::tree(&cli.global, &output),
        Commands::Show(args) => args.execute(&cli.global, &output),
        Commands::Hybrid => commands::hybrid(&cli.global, &output),
        Commands::Find(args) => args.execute(&cli.global, &output),
        Commands::Create(args) => args.execute(&cli.global, &output),
        Commands::FixUrls => commands::fix_urls(&cli.global, &output),
        Commands::Templates => commands::templates(&cli.global, &output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
