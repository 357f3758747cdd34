//! Slug and URL derivation for page subtrees.
//!
//! A non-hybrid page's URL is its parent's URL joined with its slug:
//!
//! | parent url | slug    | url             |
//! |------------|---------|-----------------|
//! | (no parent)| `about` | `/about`        |
//! | `/`        | `about` | `/about`        |
//! | `/company` | `about` | `/company/about`|
//!
//! Hybrid pages keep their URL and slug, but their children are still
//! visited and recomputed against the hybrid page's URL.

use std::collections::HashSet;

use arbor_store::{Page, PageId};

use crate::error::PageError;
use crate::slug::slugify;
use crate::tree::PageTree;

/// Assign slug and URL for a single page.
///
/// `parent_url` is the URL of the page's parent, `None` for roots or a
/// parent without a URL. Hybrid pages are left untouched. An empty slug is
/// derived from the page name.
pub fn fix_page_url(page: &mut Page, parent_url: Option<&str>) {
    if page.is_hybrid() {
        return;
    }

    if page.slug.as_deref().is_none_or(str::is_empty) {
        page.slug = Some(slugify(page.name.as_deref().unwrap_or_default()));
    }
    let slug = page.slug.as_deref().unwrap_or_default();

    let url = match parent_url {
        Some("/") | None => format!("/{slug}"),
        Some(base) => format!("{base}/{slug}"),
    };
    page.url = Some(url);
}

/// Fix URLs for `id` and every descendant, depth-first pre-order.
///
/// Returns the visited page ids in visit order, starting with `id`.
///
/// # Errors
///
/// Returns [`PageError::PageNotFound`] if `id` (or a linked child) is not in
/// the tree, and [`PageError::Cycle`] if the children links revisit a page.
/// Pages visited before the error keep their new URLs.
pub fn fix_url(tree: &mut PageTree, id: PageId) -> Result<Vec<PageId>, PageError> {
    let mut seen = HashSet::new();
    let mut visited = Vec::new();
    fix_subtree(tree, id, &mut seen, &mut visited)?;
    Ok(visited)
}

fn fix_subtree(
    tree: &mut PageTree,
    id: PageId,
    seen: &mut HashSet<PageId>,
    visited: &mut Vec<PageId>,
) -> Result<(), PageError> {
    if !seen.insert(id) {
        return Err(PageError::Cycle(id));
    }

    let parent_url = tree
        .get(id)
        .ok_or(PageError::PageNotFound(id))?
        .parent
        .and_then(|parent| tree.get(parent))
        .and_then(|parent| parent.url.clone());

    let page = tree.get_mut(id).ok_or(PageError::PageNotFound(id))?;
    fix_page_url(page, parent_url.as_deref());
    tracing::debug!(page_id = %id, url = ?page.url, "Fixed page URL");
    visited.push(id);

    let children = page.children.clone();
    for child in children {
        fix_subtree(tree, child, seen, visited)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use arbor_store::CMS_ROUTE_NAME;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn cms_page(id: i64, parent: Option<i64>, slug: &str) -> Page {
        Page {
            id: Some(PageId(id)),
            route_name: Some(CMS_ROUTE_NAME.to_owned()),
            slug: Some(slug.to_owned()),
            name: Some(format!("Page {id}")),
            parent: parent.map(PageId),
            ..Page::new(Utc::now())
        }
    }

    fn hybrid_page(id: i64, parent: Option<i64>, route: &str, url: &str) -> Page {
        Page {
            id: Some(PageId(id)),
            route_name: Some(route.to_owned()),
            slug: Some("kept".to_owned()),
            url: Some(url.to_owned()),
            parent: parent.map(PageId),
            ..Page::new(Utc::now())
        }
    }

    fn url_of(tree: &PageTree, id: i64) -> Option<&str> {
        tree.get(PageId(id)).and_then(|p| p.url.as_deref())
    }

    #[test]
    fn test_root_page_url() {
        let mut page = cms_page(1, None, "about");

        fix_page_url(&mut page, None);

        assert_eq!(page.url.as_deref(), Some("/about"));
    }

    #[test]
    fn test_parent_root_url_avoids_double_slash() {
        let mut page = cms_page(2, Some(1), "team");

        fix_page_url(&mut page, Some("/"));

        assert_eq!(page.url.as_deref(), Some("/team"));
    }

    #[test]
    fn test_nested_url() {
        let mut page = cms_page(2, Some(1), "team");

        fix_page_url(&mut page, Some("/section"));

        assert_eq!(page.url.as_deref(), Some("/section/team"));
    }

    #[test]
    fn test_empty_slug_derived_from_name() {
        let mut page = cms_page(1, None, "");
        page.name = Some("Contact Us".to_owned());

        fix_page_url(&mut page, None);

        assert_eq!(page.slug.as_deref(), Some("contact-us"));
        assert_eq!(page.url.as_deref(), Some("/contact-us"));
    }

    #[test]
    fn test_missing_slug_and_name() {
        let mut page = cms_page(1, None, "");
        page.slug = None;
        page.name = None;

        fix_page_url(&mut page, None);

        assert_eq!(page.url.as_deref(), Some("/n-a"));
    }

    #[test]
    fn test_explicit_slug_kept() {
        let mut page = cms_page(1, None, "custom");
        page.name = Some("Something Else".to_owned());

        fix_page_url(&mut page, None);

        assert_eq!(page.slug.as_deref(), Some("custom"));
    }

    #[test]
    fn test_hybrid_page_untouched() {
        let mut page = hybrid_page(1, None, "contact_form", "/app/contact");

        fix_page_url(&mut page, Some("/ignored"));

        assert_eq!(page.url.as_deref(), Some("/app/contact"));
        assert_eq!(page.slug.as_deref(), Some("kept"));
    }

    #[test]
    fn test_fix_url_recurses_preorder() {
        let mut tree = PageTree::from_pages(vec![
            cms_page(1, None, "docs"),
            cms_page(2, Some(1), "guide"),
            cms_page(3, Some(2), "setup"),
            cms_page(4, Some(1), "api"),
        ]);

        let visited = fix_url(&mut tree, PageId(1)).unwrap();

        assert_eq!(visited, vec![PageId(1), PageId(2), PageId(3), PageId(4)]);
        assert_eq!(url_of(&tree, 1), Some("/docs"));
        assert_eq!(url_of(&tree, 2), Some("/docs/guide"));
        assert_eq!(url_of(&tree, 3), Some("/docs/guide/setup"));
        assert_eq!(url_of(&tree, 4), Some("/docs/api"));
    }

    #[test]
    fn test_hybrid_parent_children_still_fixed() {
        let mut tree = PageTree::from_pages(vec![
            hybrid_page(1, None, "homepage", "/"),
            cms_page(2, Some(1), "about"),
            hybrid_page(3, Some(1), "shop", "/shop"),
            cms_page(4, Some(3), "cart"),
        ]);

        fix_url(&mut tree, PageId(1)).unwrap();

        assert_eq!(url_of(&tree, 1), Some("/"));
        assert_eq!(url_of(&tree, 2), Some("/about"));
        assert_eq!(url_of(&tree, 3), Some("/shop"));
        assert_eq!(url_of(&tree, 4), Some("/shop/cart"));
    }

    #[test]
    fn test_fix_url_uses_parent_url_from_tree() {
        let mut parent = hybrid_page(1, None, "blog", "/blog");
        parent.children.clear();
        let mut tree = PageTree::from_pages(vec![parent, cms_page(2, Some(1), "post")]);

        let visited = fix_url(&mut tree, PageId(2)).unwrap();

        assert_eq!(visited, vec![PageId(2)]);
        assert_eq!(url_of(&tree, 2), Some("/blog/post"));
    }

    #[test]
    fn test_fix_url_unknown_page() {
        let mut tree = PageTree::from_pages(Vec::new());

        let result = fix_url(&mut tree, PageId(7));

        assert!(matches!(result, Err(PageError::PageNotFound(PageId(7)))));
    }

    #[test]
    fn test_fix_url_detects_cycle() {
        let mut tree = PageTree::from_pages(vec![
            cms_page(1, Some(2), "a"),
            cms_page(2, Some(1), "b"),
        ]);

        let result = fix_url(&mut tree, PageId(1));

        assert!(matches!(result, Err(PageError::Cycle(PageId(1)))));
    }
}
