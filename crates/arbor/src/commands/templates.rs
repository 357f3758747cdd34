//! `templates` command implementation.

use arbor_pages::TemplateRegistry;

use super::GlobalArgs;
use crate::error::CliError;
use crate::output::Output;

/// Execute the templates command.
///
/// Reads configuration only, the database is not opened.
pub(crate) fn templates(global: &GlobalArgs, output: &Output) -> Result<(), CliError> {
    let config = global.load_config()?;
    let registry = TemplateRegistry::from_config(&config.templates);

    if registry.templates().is_empty() {
        output.warning("No templates configured");
        return Ok(());
    }

    let default_code = registry.default_template().ok().map(|t| t.code.as_str());
    for template in registry.templates().values() {
        let marker = if Some(template.code.as_str()) == default_code {
            " (default)"
        } else {
            ""
        };
        output.line(&format!(
            "{}{marker}  {}  {}",
            template.code, template.name, template.path
        ));
    }
    if default_code.is_none() {
        output.warning("No default template configured");
    }

    Ok(())
}
