//! Page record.
//!
//! A [`Page`] is one node of the site tree as stored by a repository. Tree
//! links are kept as ids: `parent` is persisted, `children` is filled in
//! transiently when a whole tree is loaded.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Route name reserved for pages served by slug-based CMS routing.
///
/// Pages with any other route name (or none) are hybrid.
pub const CMS_ROUTE_NAME: &str = "page_slug";

/// Route name of the site homepage.
pub const HOMEPAGE_ROUTE_NAME: &str = "homepage";

/// Page identity assigned by the repository on first persist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(pub i64);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PageId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Page data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Identity, `None` until persisted.
    pub id: Option<PageId>,
    /// Symbolic route used to dispatch requests (e.g., "homepage").
    pub route_name: Option<String>,
    /// URL segment of this page.
    pub slug: Option<String>,
    /// Absolute URL path (e.g., "/about/team").
    pub url: Option<String>,
    /// Display label.
    pub name: Option<String>,
    /// Whether the page is published.
    pub enabled: bool,
    /// Template code.
    pub template: Option<String>,
    /// Sibling ordering, ascending.
    pub position: i64,
    /// Parent page, `None` for roots.
    pub parent: Option<PageId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Child ids in position order. Only meaningful when `children_loaded`.
    #[serde(skip)]
    pub children: Vec<PageId>,
    /// True once `children` holds the complete child set.
    #[serde(skip)]
    pub children_loaded: bool,
}

impl Page {
    /// Create an unsaved, enabled page with every optional field empty.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            route_name: None,
            slug: None,
            url: None,
            name: None,
            enabled: true,
            template: None,
            position: 0,
            parent: None,
            created_at: now,
            updated_at: now,
            children: Vec::new(),
            children_loaded: false,
        }
    }

    /// True if the page is bound to an application route instead of
    /// slug-based routing. Hybrid pages keep externally assigned URLs.
    #[must_use]
    pub fn is_hybrid(&self) -> bool {
        self.route_name.as_deref() != Some(CMS_ROUTE_NAME)
    }

    /// True if this is the homepage route.
    #[must_use]
    pub fn is_homepage(&self) -> bool {
        self.route_name.as_deref() == Some(HOMEPAGE_ROUTE_NAME)
    }

    /// Mark the children set as fully materialized.
    pub fn disable_children_lazy_loading(&mut self) {
        self.children_loaded = true;
    }

    /// Append a child id.
    pub fn add_child(&mut self, child: PageId) {
        self.children.push(child);
    }
}
