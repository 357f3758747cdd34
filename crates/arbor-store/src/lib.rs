//! Page persistence for Arbor.
//!
//! This crate provides the [`PageRepository`] trait, the storage-facing side
//! of the page manager. It covers equality lookups, a bulk ordered load and
//! transactional persistence of page records.
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Page`] record and [`PageId`] identity
//! - [`Criteria`] for field-equality filters
//! - [`SqliteRepository`] backed by sqlx
//! - [`MockRepository`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use arbor_store::{Criteria, PageField, PageRepository, SqliteRepository};
//!
//! let repository = SqliteRepository::connect("sqlite://arbor.db")?;
//! let criteria = Criteria::new().eq(PageField::RouteName, "homepage");
//! let homepage = repository.find_one_by(&criteria)?;
//! ```

#![warn(missing_docs)]

mod criteria;
#[cfg(feature = "mock")]
mod mock;
mod page;
mod repository;
mod sqlite;

pub use criteria::{Criteria, PageField, Value};
#[cfg(feature = "mock")]
pub use mock::MockRepository;
pub use page::{CMS_ROUTE_NAME, HOMEPAGE_ROUTE_NAME, Page, PageId};
pub use repository::{PageRepository, StoreError, StoreErrorKind};
pub use sqlite::SqliteRepository;
