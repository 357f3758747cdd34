//! Page listing commands: `tree`, `show`, `hybrid`, `find`, `fix-urls`.

use arbor_pages::{Page, PageId, PageTree};
use arbor_store::Criteria;
use clap::Args;

use super::GlobalArgs;
use crate::error::CliError;
use crate::output::Output;

/// One-line page summary: `name  url  [route]`.
fn describe(page: &Page) -> String {
    let name = page.name.as_deref().unwrap_or("(unnamed)");
    let url = page.url.as_deref().unwrap_or("-");
    let id = page.id.map_or_else(|| "new".to_owned(), |id| id.to_string());
    let route = page
        .route_name
        .as_deref()
        .map(|route| format!("  [{route}]"))
        .unwrap_or_default();
    let disabled = if page.enabled { "" } else { "  (disabled)" };
    format!("#{id} {name}  {url}{route}{disabled}")
}

/// Indented tree listing, two spaces per level.
fn render_tree(tree: &PageTree) -> Vec<String> {
    fn walk(tree: &PageTree, page: &Page, depth: usize, lines: &mut Vec<String>) {
        lines.push(format!("{}{}", "  ".repeat(depth), describe(page)));
        if let Some(id) = page.id {
            for child in tree.children(id) {
                walk(tree, child, depth + 1, lines);
            }
        }
    }

    let mut lines = Vec::new();
    for root in tree.roots() {
        walk(tree, root, 0, &mut lines);
    }
    lines
}

fn print_pages(pages: &[Page], output: &Output) {
    if pages.is_empty() {
        output.warning("No pages found");
    }
    for page in pages {
        output.line(&describe(page));
    }
}

/// Execute the tree command.
pub(crate) fn tree(global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
    let manager = global.page_manager()?;
    let tree = manager.load_page_tree()?;

    if tree.is_empty() {
        output.warning("No pages found");
        return Ok(());
    }
    for line in render_tree(&tree) {
        output.line(&line);
    }
    Ok(())
}

/// Execute the hybrid command.
pub(crate) fn hybrid(global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
    let manager = global.page_manager()?;
    print_pages(&manager.find_hybrid_pages()?, output);
    Ok(())
}

/// Execute the fix-urls command.
pub(crate) fn fix_urls(global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
    let manager = global.page_manager()?;
    let count = manager.fix_all_urls()?;
    output.success(&format!("Updated {count} page(s)"));
    Ok(())
}

/// Arguments for the show command.
#[derive(Args)]
#[group(required = true, multiple = false)]
pub(crate) struct ShowArgs {
    /// Route name of the page (e.g., "homepage").
    #[arg(long)]
    route: Option<String>,

    /// Absolute URL of the page (e.g., "/about").
    #[arg(long)]
    url: Option<String>,
}

impl ShowArgs {
    /// Execute the show command.
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let manager = global.page_manager()?;

        let (page, key) = match (self.route, self.url) {
            (Some(route), _) => (manager.find_by_route_name(&route)?, format!("route {route}")),
            (None, Some(url)) => (manager.find_by_url(&url)?, format!("url {url}")),
            (None, None) => (None, "no key".to_owned()),
        };
        let page = page.ok_or_else(|| CliError::NotFound(format!("No page with {key}")))?;

        output.highlight(&describe(&page));
        output.line(&format!("slug:       {}", page.slug.as_deref().unwrap_or("-")));
        output.line(&format!("template:   {}", page.template.as_deref().unwrap_or("-")));
        output.line(&format!("hybrid:     {}", page.is_hybrid()));
        output.line(&format!("position:   {}", page.position));
        output.line(&format!("created at: {}", page.created_at.to_rfc3339()));
        output.line(&format!("updated at: {}", page.updated_at.to_rfc3339()));

        if let Some(id) = page.id {
            let tree = manager.load_page_tree()?;
            let trail: Vec<String> = tree
                .breadcrumbs(id)
                .iter()
                .map(|p| p.name.clone().unwrap_or_else(|| "(unnamed)".to_owned()))
                .collect();
            if !trail.is_empty() {
                output.dim_line(&format!("parents:    {}", trail.join(" > ")));
            }
            for child in tree.children(id) {
                output.dim_line(&format!("  child {}", describe(child)));
            }
            let descendants = tree.descendants(id).len();
            if descendants > 0 {
                output.dim_line(&format!("descendants: {descendants}"));
            }
        }

        Ok(())
    }
}

/// Arguments for the find command.
#[derive(Args)]
pub(crate) struct FindArgs {
    /// Filter as `field=value` (repeatable). Fields: id, route_name, slug,
    /// url, name, enabled, template, position, parent. Use `null` for unset.
    #[arg(short = 'w', long = "where", value_name = "FIELD=VALUE")]
    filters: Vec<String>,
}

impl FindArgs {
    /// Execute the find command.
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let criteria = parse_criteria(&self.filters)?;
        let manager = global.page_manager()?;
        print_pages(&manager.find_by(&criteria)?, output);
        Ok(())
    }
}

fn parse_criteria(filters: &[String]) -> Result<Criteria, CliError> {
    filters
        .iter()
        .try_fold(Criteria::new(), |criteria, expr| criteria.parse_filter(expr))
        .map_err(CliError::from)
}

/// Parse a `--parent` argument.
pub(crate) fn parse_page_id(raw: &str) -> Result<PageId, String> {
    raw.parse::<i64>()
        .map(PageId)
        .map_err(|_| format!("invalid page id: {raw}"))
}
