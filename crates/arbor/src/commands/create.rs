//! `create` command implementation.

use arbor_pages::{NewPage, PageId, TemplateRegistry};
use arbor_store::{CMS_ROUTE_NAME, Criteria, PageField};
use clap::Args;

use super::GlobalArgs;
use super::pages::parse_page_id;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the create command.
#[derive(Args)]
pub(crate) struct CreateArgs {
    /// Display name of the page.
    #[arg(long)]
    name: String,

    /// URL segment (default: derived from the name).
    #[arg(long)]
    slug: Option<String>,

    /// Id of the parent page.
    #[arg(long, value_parser = parse_page_id)]
    parent: Option<PageId>,

    /// Route name. Anything other than the CMS route makes a hybrid page.
    #[arg(long, default_value = CMS_ROUTE_NAME)]
    route: String,

    /// Template code (default: the configured default template).
    #[arg(long)]
    template: Option<String>,

    /// Sort order among siblings.
    #[arg(long, default_value_t = 0)]
    position: i64,

    /// Create the page unpublished.
    #[arg(long)]
    disabled: bool,
}

impl CreateArgs {
    /// Execute the create command.
    pub(crate) fn execute(self, global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
        let manager = global.page_manager()?;
        let template = resolve_template(manager.templates(), self.template.as_deref())?;

        let mut page = manager.create_new_page(NewPage {
            template,
            enabled: Some(!self.disabled),
            route_name: Some(self.route),
            name: Some(self.name),
            slug: self.slug,
            url: None,
        });
        page.parent = self.parent;
        page.position = self.position;

        if let Some(parent) = page.parent
            && manager
                .find_one_by(&Criteria::new().eq(PageField::Id, parent))?
                .is_none()
        {
            return Err(CliError::NotFound(format!("No parent page with id {parent}")));
        }

        let page = manager.save(page)?;
        let id = page.id.map_or_else(|| "?".to_owned(), |id| id.to_string());
        let url = page.url.as_deref().unwrap_or("-");
        output.success(&format!("Created page #{id} at {url}"));
        Ok(())
    }
}

/// Pick the template code for a new page.
///
/// An explicit code must be registered. Without one the default template is
/// used, or no template if the registry has no default.
fn resolve_template(
    registry: &TemplateRegistry,
    code: Option<&str>,
) -> Result<Option<String>, CliError> {
    match code {
        Some(code) => Ok(Some(registry.template(code)?.code.clone())),
        None => Ok(registry.default_template().ok().map(|t| t.code.clone())),
    }
}
