//! Page tree, URL and template management for Arbor.
//!
//! This crate provides:
//! - [`PageManager`]: lookups, page creation and URL-normalizing saves
//! - [`PageTree`]: id-indexed page arena with parent/children links
//! - [`url_fixer`]: slug and URL derivation over a page subtree
//! - [`TemplateRegistry`]: template definitions keyed by code
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use arbor_pages::{NewPage, PageManager, TemplateRegistry};
//! use arbor_store::SqliteRepository;
//!
//! let repository = Arc::new(SqliteRepository::connect("sqlite://arbor.db")?);
//! let manager = PageManager::new(repository, TemplateRegistry::new());
//!
//! let page = manager.create_new_page(NewPage {
//!     name: Some("About us".to_owned()),
//!     route_name: Some(arbor_store::CMS_ROUTE_NAME.to_owned()),
//!     ..NewPage::default()
//! });
//! let page = manager.save(page)?;
//! assert_eq!(page.url.as_deref(), Some("/about-us"));
//! # Ok(())
//! # }
//! ```

mod error;
mod manager;
mod slug;
mod templates;
mod tree;
pub mod url_fixer;

pub use error::PageError;
pub use manager::{NewPage, PageManager};
pub use slug::slugify;
pub use templates::{ConfigurationError, Template, TemplateRegistry};
pub use tree::PageTree;

pub use arbor_store::{Page, PageId};
