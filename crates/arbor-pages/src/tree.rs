//! Page tree assembled from a flat page list.
//!
//! # Architecture
//!
//! Pages are stored in a flat `Vec<Page>` in position order with an id index.
//! Parent/children relationships are plain [`PageId`]s held on each page, so
//! the arena owns every page and no page owns another. This provides:
//! - O(1) id lookups via the `index` `HashMap`
//! - O(n) construction from a single ordered load
//! - O(d) ancestor walks where d is the page depth

use std::collections::{HashMap, HashSet};

use arbor_store::{Page, PageId};

/// Id-indexed page arena with materialized children.
#[derive(Clone, Debug, Default)]
pub struct PageTree {
    pages: Vec<Page>,
    index: HashMap<PageId, usize>,
    roots: Vec<PageId>,
}

impl PageTree {
    /// Link a position-ordered page list into a tree.
    ///
    /// Every page gets its children set marked as loaded. Each page with a
    /// parent is appended to that parent's children, so siblings keep the
    /// input order. Pages whose parent is missing from `pages` become roots.
    /// Pages without an id cannot be linked and are skipped.
    #[must_use]
    pub fn from_pages(pages: Vec<Page>) -> Self {
        let mut tree = Self::default();

        for mut page in pages {
            let Some(id) = page.id else {
                tracing::warn!(name = ?page.name, "Skipping unsaved page in page tree");
                continue;
            };
            page.children.clear();
            tree.index.insert(id, tree.pages.len());
            tree.pages.push(page);
        }

        for idx in 0..tree.pages.len() {
            let (id, parent) = {
                let page = &mut tree.pages[idx];
                page.disable_children_lazy_loading();
                (page.id, page.parent)
            };
            let Some(id) = id else { continue };

            match parent {
                Some(parent) if tree.index.contains_key(&parent) => {
                    let parent_idx = tree.index[&parent];
                    let parent_page = &mut tree.pages[parent_idx];
                    parent_page.disable_children_lazy_loading();
                    parent_page.add_child(id);
                }
                Some(parent) => {
                    tracing::warn!(
                        page_id = %id,
                        parent_id = %parent,
                        "Parent page missing, treating as root"
                    );
                    tree.roots.push(id);
                }
                None => tree.roots.push(id),
            }
        }

        tree
    }

    /// Get page by id.
    #[must_use]
    pub fn get(&self, id: PageId) -> Option<&Page> {
        self.index.get(&id).map(|&i| &self.pages[i])
    }

    /// Get mutable page by id.
    ///
    /// Changing `parent` or `children` through this reference leaves the
    /// tree links stale; use [`PageTree::upsert`] to move a page.
    #[must_use]
    pub fn get_mut(&mut self, id: PageId) -> Option<&mut Page> {
        self.index.get(&id).map(|&i| &mut self.pages[i])
    }

    /// True if a page with `id` is in the tree.
    #[must_use]
    pub fn contains(&self, id: PageId) -> bool {
        self.index.contains_key(&id)
    }

    /// All pages in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    /// Number of pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// True if the tree has no pages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Pages without a (known) parent, in position order.
    #[must_use]
    pub fn roots(&self) -> Vec<&Page> {
        self.roots.iter().filter_map(|&id| self.get(id)).collect()
    }

    /// Children of `id` in sibling order, empty for unknown ids.
    #[must_use]
    pub fn children(&self, id: PageId) -> Vec<&Page> {
        self.get(id)
            .map(|page| page.children.iter().filter_map(|&c| self.get(c)).collect())
            .unwrap_or_default()
    }

    /// Descendants of `id` in pre-order, excluding the page itself.
    ///
    /// A page reachable twice through corrupt links is listed once.
    #[must_use]
    pub fn descendants(&self, id: PageId) -> Vec<&Page> {
        let mut seen = HashSet::from([id]);
        let mut result = Vec::new();
        let mut stack: Vec<PageId> = self
            .get(id)
            .map(|p| p.children.iter().rev().copied().collect())
            .unwrap_or_default();

        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            let Some(page) = self.get(next) else {
                continue;
            };
            result.push(page);
            stack.extend(page.children.iter().rev().copied());
        }
        result
    }

    /// Ancestors of `id`, root first, excluding the page itself.
    ///
    /// Stops after `len()` steps so a corrupt parent chain cannot loop.
    #[must_use]
    pub fn breadcrumbs(&self, id: PageId) -> Vec<&Page> {
        let mut ancestors = Vec::new();
        let mut current = self.get(id).and_then(|p| p.parent);
        while let Some(parent_id) = current {
            let Some(parent) = self.get(parent_id) else {
                break;
            };
            if ancestors.len() >= self.pages.len() {
                break;
            }
            ancestors.push(parent);
            current = parent.parent;
        }
        ancestors.reverse();
        ancestors
    }

    /// Insert or replace the page with `id`, relinking it under its parent.
    ///
    /// A replaced page keeps the children already linked in the tree.
    /// Siblings are re-sorted by position.
    pub fn upsert(&mut self, id: PageId, mut page: Page) {
        page.id = Some(id);
        page.disable_children_lazy_loading();

        match self.index.get(&id).copied() {
            Some(idx) => {
                let old_parent = self.linked_parent(idx);
                page.children = std::mem::take(&mut self.pages[idx].children);
                self.pages[idx] = page;
                self.unlink(id, old_parent);
            }
            None => {
                page.children.clear();
                self.index.insert(id, self.pages.len());
                self.pages.push(page);
            }
        }

        let new_parent = self.linked_parent(self.index[&id]);
        self.link(id, new_parent);
    }

    /// Consume the tree, returning pages in load order.
    #[must_use]
    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }

    /// Parent id of the page at `idx` if that parent is in the tree.
    fn linked_parent(&self, idx: usize) -> Option<PageId> {
        self.pages[idx]
            .parent
            .filter(|p| self.index.contains_key(p))
    }

    fn unlink(&mut self, id: PageId, parent: Option<PageId>) {
        match parent {
            Some(parent) => {
                let parent_idx = self.index[&parent];
                self.pages[parent_idx].children.retain(|&c| c != id);
            }
            None => self.roots.retain(|&r| r != id),
        }
    }

    fn link(&mut self, id: PageId, parent: Option<PageId>) {
        let mut siblings = match parent {
            Some(parent) => std::mem::take(&mut self.pages[self.index[&parent]].children),
            None => std::mem::take(&mut self.roots),
        };
        siblings.push(id);
        siblings.sort_by_key(|&s| (self.get(s).map_or(0, |p| p.position), s));

        match parent {
            Some(parent) => {
                let parent_page = &mut self.pages[self.index[&parent]];
                parent_page.disable_children_lazy_loading();
                parent_page.children = siblings;
            }
            None => self.roots = siblings,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn page(id: i64, parent: Option<i64>, position: i64) -> Page {
        Page {
            id: Some(PageId(id)),
            name: Some(format!("Page {id}")),
            parent: parent.map(PageId),
            position,
            ..Page::new(Utc::now())
        }
    }

    fn ids(pages: &[&Page]) -> Vec<i64> {
        pages.iter().filter_map(|p| p.id).map(|id| id.0).collect()
    }

    #[test]
    fn test_from_pages_links_children_in_order() {
        let tree = PageTree::from_pages(vec![
            page(1, None, 0),
            page(2, Some(1), 0),
            page(3, Some(1), 1),
        ]);

        let root = tree.get(PageId(1)).unwrap();

        assert_eq!(root.children, vec![PageId(2), PageId(3)]);
        assert_eq!(ids(&tree.children(PageId(1))), vec![2, 3]);
        assert_eq!(ids(&tree.roots()), vec![1]);
    }

    #[test]
    fn test_from_pages_marks_children_loaded() {
        let tree = PageTree::from_pages(vec![page(1, None, 0), page(2, Some(1), 0)]);

        assert!(tree.iter().all(|p| p.children_loaded));
    }

    #[test]
    fn test_from_pages_child_before_parent() {
        let tree = PageTree::from_pages(vec![page(2, Some(1), 0), page(1, None, 1)]);

        assert_eq!(ids(&tree.children(PageId(1))), vec![2]);
        assert_eq!(ids(&tree.roots()), vec![1]);
    }

    #[test]
    fn test_from_pages_missing_parent_becomes_root() {
        let tree = PageTree::from_pages(vec![page(1, None, 0), page(5, Some(99), 1)]);

        assert_eq!(ids(&tree.roots()), vec![1, 5]);
    }

    #[test]
    fn test_from_pages_skips_unsaved() {
        let mut unsaved = page(1, None, 0);
        unsaved.id = None;

        let tree = PageTree::from_pages(vec![unsaved, page(2, None, 1)]);

        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_from_pages_discards_stale_children() {
        let mut parent = page(1, None, 0);
        parent.children = vec![PageId(42)];

        let tree = PageTree::from_pages(vec![parent, page(2, Some(1), 0)]);

        assert_eq!(tree.get(PageId(1)).unwrap().children, vec![PageId(2)]);
    }

    #[test]
    fn test_empty_tree() {
        let tree = PageTree::from_pages(Vec::new());

        assert!(tree.is_empty());
        assert!(tree.roots().is_empty());
        assert!(tree.get(PageId(1)).is_none());
        assert!(tree.children(PageId(1)).is_empty());
    }

    #[test]
    fn test_descendants_preorder() {
        let tree = PageTree::from_pages(vec![
            page(1, None, 0),
            page(2, Some(1), 0),
            page(3, Some(2), 0),
            page(4, Some(1), 1),
        ]);

        assert_eq!(ids(&tree.descendants(PageId(1))), vec![2, 3, 4]);
        assert!(tree.descendants(PageId(4)).is_empty());
        assert!(tree.descendants(PageId(99)).is_empty());
    }

    #[test]
    fn test_descendants_terminates_on_cycle() {
        let tree = PageTree::from_pages(vec![page(1, Some(2), 0), page(2, Some(1), 0)]);

        assert_eq!(ids(&tree.descendants(PageId(1))), vec![2]);
    }

    #[test]
    fn test_breadcrumbs() {
        let tree = PageTree::from_pages(vec![
            page(1, None, 0),
            page(2, Some(1), 0),
            page(3, Some(2), 0),
        ]);

        assert_eq!(ids(&tree.breadcrumbs(PageId(3))), vec![1, 2]);
        assert!(tree.breadcrumbs(PageId(1)).is_empty());
        assert!(tree.breadcrumbs(PageId(99)).is_empty());
    }

    #[test]
    fn test_breadcrumbs_terminates_on_cycle() {
        let tree = PageTree::from_pages(vec![page(1, Some(2), 0), page(2, Some(1), 0)]);

        let crumbs = tree.breadcrumbs(PageId(1));

        assert!(crumbs.len() <= 2);
    }

    #[test]
    fn test_upsert_replaces_and_keeps_children() {
        let mut tree = PageTree::from_pages(vec![page(1, None, 0), page(2, Some(1), 0)]);
        let mut updated = page(1, None, 0);
        updated.slug = Some("home".to_owned());

        tree.upsert(PageId(1), updated);

        let root = tree.get(PageId(1)).unwrap();
        assert_eq!(root.slug.as_deref(), Some("home"));
        assert_eq!(root.children, vec![PageId(2)]);
        assert_eq!(ids(&tree.roots()), vec![1]);
    }

    #[test]
    fn test_upsert_moves_page_to_new_parent() {
        let mut tree = PageTree::from_pages(vec![
            page(1, None, 0),
            page(2, None, 1),
            page(3, Some(1), 0),
        ]);

        tree.upsert(PageId(3), page(3, Some(2), 0));

        assert!(tree.children(PageId(1)).is_empty());
        assert_eq!(ids(&tree.children(PageId(2))), vec![3]);
    }

    #[test]
    fn test_upsert_inserts_new_page_by_position() {
        let mut tree = PageTree::from_pages(vec![
            page(1, None, 0),
            page(2, Some(1), 0),
            page(3, Some(1), 2),
        ]);

        tree.upsert(PageId(4), page(4, Some(1), 1));

        assert_eq!(ids(&tree.children(PageId(1))), vec![2, 4, 3]);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_upsert_root_to_child() {
        let mut tree = PageTree::from_pages(vec![page(1, None, 0), page(2, None, 1)]);

        tree.upsert(PageId(2), page(2, Some(1), 0));

        assert_eq!(ids(&tree.roots()), vec![1]);
        assert_eq!(ids(&tree.children(PageId(1))), vec![2]);
    }

    #[test]
    fn test_into_pages_preserves_order() {
        let tree = PageTree::from_pages(vec![page(1, None, 0), page(2, Some(1), 0)]);

        let pages = tree.into_pages();

        assert_eq!(pages[0].id, Some(PageId(1)));
        assert_eq!(pages[1].id, Some(PageId(2)));
    }
}
