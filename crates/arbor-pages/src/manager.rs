//! Page manager.
//!
//! [`PageManager`] is the entry point for callers: it wraps a
//! [`PageRepository`], owns the [`TemplateRegistry`] and keeps page URLs
//! consistent on save.

use std::sync::Arc;

use arbor_store::{CMS_ROUTE_NAME, Criteria, Page, PageField, PageRepository};
use chrono::Utc;
use serde::Deserialize;

use crate::error::PageError;
use crate::templates::TemplateRegistry;
use crate::tree::PageTree;
use crate::url_fixer;

/// Initial values for [`PageManager::create_new_page`].
///
/// Absent fields leave the page field empty, except `enabled` which
/// defaults to `true`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewPage {
    /// Template code.
    pub template: Option<String>,
    /// Published flag.
    pub enabled: Option<bool>,
    /// Route name.
    pub route_name: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// URL segment.
    pub slug: Option<String>,
    /// Absolute URL.
    pub url: Option<String>,
}

/// Page lookups, creation and persistence.
pub struct PageManager {
    repository: Arc<dyn PageRepository>,
    templates: TemplateRegistry,
}

impl PageManager {
    /// Create a manager over `repository` with the given templates.
    #[must_use]
    pub fn new(repository: Arc<dyn PageRepository>, templates: TemplateRegistry) -> Self {
        Self {
            repository,
            templates,
        }
    }

    /// Template registry.
    #[must_use]
    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Mutable template registry.
    pub fn templates_mut(&mut self) -> &mut TemplateRegistry {
        &mut self.templates
    }

    /// First page with the given route name.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Store`] if the lookup fails. No match is `Ok(None)`.
    pub fn find_by_route_name(&self, route_name: &str) -> Result<Option<Page>, PageError> {
        self.find_one_by(&Criteria::new().eq(PageField::RouteName, route_name))
    }

    /// First page with the given URL.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Store`] if the lookup fails. No match is `Ok(None)`.
    pub fn find_by_url(&self, url: &str) -> Result<Option<Page>, PageError> {
        self.find_one_by(&Criteria::new().eq(PageField::Url, url))
    }

    /// Pages routed by the application rather than by slug.
    ///
    /// Pages without a route name are not included.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Store`] if the query fails.
    pub fn find_hybrid_pages(&self) -> Result<Vec<Page>, PageError> {
        Ok(self.repository.find_route_name_not(CMS_ROUTE_NAME)?)
    }

    /// All pages matching `criteria`.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Store`] if the query fails.
    pub fn find_by(&self, criteria: &Criteria) -> Result<Vec<Page>, PageError> {
        Ok(self.repository.find_by(criteria)?)
    }

    /// First page matching `criteria`.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Store`] if the query fails.
    pub fn find_one_by(&self, criteria: &Criteria) -> Result<Option<Page>, PageError> {
        Ok(self.repository.find_one_by(criteria)?)
    }

    /// Build an unsaved page from `defaults`, stamped with the current time.
    #[must_use]
    pub fn create_new_page(&self, defaults: NewPage) -> Page {
        Page {
            template: defaults.template,
            enabled: defaults.enabled.unwrap_or(true),
            route_name: defaults.route_name,
            name: defaults.name,
            slug: defaults.slug,
            url: defaults.url,
            ..Page::new(Utc::now())
        }
    }

    /// Persist `page`, returning the stored copy.
    ///
    /// Non-hybrid pages and the homepage get their URL fixed first, together
    /// with every descendant; the page and all descendants are then written
    /// in one transaction. Other hybrid pages are written as-is.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Store`] if loading or writing fails and
    /// [`PageError::Cycle`] if the page tree is not acyclic. Nothing is
    /// written on error.
    pub fn save(&self, mut page: Page) -> Result<Page, PageError> {
        page.updated_at = Utc::now();

        if page.is_hybrid() && !page.is_homepage() {
            return self.persist_one(page);
        }

        let mut tree = self.load_page_tree()?;

        let Some(id) = page.id else {
            // Unsaved pages have no children yet.
            let parent_url = page
                .parent
                .and_then(|parent| tree.get(parent))
                .and_then(|parent| parent.url.as_deref());
            url_fixer::fix_page_url(&mut page, parent_url);
            return self.persist_one(page);
        };

        tree.upsert(id, page);
        let visited = url_fixer::fix_url(&mut tree, id)?;

        let mut batch: Vec<Page> = visited
            .iter()
            .filter_map(|&visited_id| tree.get(visited_id).cloned())
            .collect();
        self.repository.persist(&mut batch)?;

        tracing::info!(page_id = %id, pages = batch.len(), "Saved page subtree");

        batch
            .into_iter()
            .next()
            .ok_or(PageError::PageNotFound(id))
    }

    /// Fix URLs of every root subtree and persist them in one transaction.
    ///
    /// Roots that are hybrid (other than the homepage) are skipped together
    /// with their subtrees, matching [`PageManager::save`].
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Store`] if loading or writing fails and
    /// [`PageError::Cycle`] if the page tree is not acyclic.
    pub fn fix_all_urls(&self) -> Result<usize, PageError> {
        let mut tree = self.load_page_tree()?;
        let roots: Vec<_> = tree
            .roots()
            .into_iter()
            .filter(|root| !root.is_hybrid() || root.is_homepage())
            .filter_map(|root| root.id)
            .collect();

        let mut visited = Vec::new();
        for root in roots {
            visited.extend(url_fixer::fix_url(&mut tree, root)?);
        }

        let now = Utc::now();
        let mut batch: Vec<Page> = visited
            .iter()
            .filter_map(|&id| tree.get(id).cloned())
            .map(|mut page| {
                page.updated_at = now;
                page
            })
            .collect();
        self.repository.persist(&mut batch)?;

        tracing::info!(pages = batch.len(), "Fixed page URLs");

        Ok(batch.len())
    }

    /// Load every page and link parents to children.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Store`] if the load fails.
    pub fn load_page_tree(&self) -> Result<PageTree, PageError> {
        let pages = self.repository.load_all()?;
        tracing::debug!(pages = pages.len(), "Loaded page tree");
        Ok(PageTree::from_pages(pages))
    }

    fn persist_one(&self, page: Page) -> Result<Page, PageError> {
        let mut batch = [page];
        self.repository.persist(&mut batch)?;
        let [page] = batch;
        tracing::info!(page_id = ?page.id, url = ?page.url, "Saved page");
        Ok(page)
    }
}
