//! Mock repository implementation for testing.
//!
//! Provides [`MockRepository`] for unit testing without a database.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::criteria::Criteria;
use crate::page::{Page, PageId};
use crate::repository::{PageRepository, StoreError, StoreErrorKind};

/// Mock repository for testing.
///
/// Stores pages in memory. Use the builder methods to configure the mock
/// with test data.
///
/// # Example
///
/// ```ignore
/// use arbor_store::{MockRepository, PageRepository};
///
/// let repository = MockRepository::new().with_page(homepage);
/// let pages = repository.load_all().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockRepository {
    pages: RwLock<Vec<Page>>,
    fail_next_persist: AtomicBool,
    persist_calls: AtomicUsize,
}

impl MockRepository {
    /// Create a new empty mock repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stored page. Pages without an id get the next free id.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, mut page: Page) -> Self {
        {
            let mut pages = self.pages.write().unwrap();
            if page.id.is_none() {
                page.id = Some(next_id(&pages));
            }
            page.children.clear();
            page.children_loaded = false;
            pages.push(page);
        }
        self
    }

    /// Make the next `persist` call fail with an `Unavailable` error.
    pub fn fail_next_persist(&self) {
        self.fail_next_persist.store(true, Ordering::SeqCst);
    }

    /// Number of `persist` calls so far, including failed ones.
    #[must_use]
    pub fn persist_calls(&self) -> usize {
        self.persist_calls.load(Ordering::SeqCst)
    }

    /// Stored copy of the page with `id`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn stored(&self, id: PageId) -> Option<Page> {
        self.pages
            .read()
            .unwrap()
            .iter()
            .find(|p| p.id == Some(id))
            .cloned()
    }

    fn sorted(&self, filter: impl Fn(&Page) -> bool) -> Vec<Page> {
        let mut pages: Vec<Page> = self
            .pages
            .read()
            .unwrap()
            .iter()
            .filter(|p| filter(p))
            .cloned()
            .collect();
        pages.sort_by_key(|p| (p.position, p.id));
        pages
    }
}

fn next_id(pages: &[Page]) -> PageId {
    let max = pages.iter().filter_map(|p| p.id).map(|id| id.0).max();
    PageId(max.unwrap_or(0) + 1)
}

impl PageRepository for MockRepository {
    fn find_by(&self, criteria: &Criteria) -> Result<Vec<Page>, StoreError> {
        Ok(self.sorted(|p| criteria.matches(p)))
    }

    fn find_route_name_not(&self, route_name: &str) -> Result<Vec<Page>, StoreError> {
        Ok(self.sorted(|p| p.route_name.as_deref().is_some_and(|r| r != route_name)))
    }

    fn load_all(&self) -> Result<Vec<Page>, StoreError> {
        Ok(self.sorted(|_| true))
    }

    fn persist(&self, pages: &mut [Page]) -> Result<(), StoreError> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_next_persist.swap(false, Ordering::SeqCst) {
            return Err(StoreError::new(StoreErrorKind::Unavailable)
                .with_backend("Mock")
                .with_message("persist failure requested"));
        }

        let mut stored = self.pages.write().unwrap();

        // Check every update target first so a failure writes nothing.
        if let Some(missing) = pages
            .iter()
            .filter_map(|p| p.id)
            .find(|id| !stored.iter().any(|s| s.id == Some(*id)))
        {
            return Err(StoreError::new(StoreErrorKind::NotFound)
                .with_backend("Mock")
                .with_message(format!("page {missing}")));
        }

        for page in pages.iter_mut() {
            if page.id.is_none() {
                page.id = Some(next_id(&stored));
            }
            let mut record = page.clone();
            record.children.clear();
            record.children_loaded = false;

            match stored.iter_mut().find(|s| s.id == record.id) {
                Some(existing) => *existing = record,
                None => stored.push(record),
            }
        }

        Ok(())
    }
}
