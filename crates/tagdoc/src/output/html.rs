use std::fs;
use std::path::Path;

use minijinja::{Environment, context, path_loader};

use crate::config::FUNCTION_TEMPLATE;
use crate::docs::{DeclKind, SymbolRegistry};
use crate::error::Result;

/// Render every function definition through the function template found in
/// `templates`, one block per line.
pub fn render_functions(
    registry: &SymbolRegistry,
    templates: &Path,
) -> Result<String> {
    let mut env = Environment::new();
    env.set_loader(path_loader(templates));
    let template = env.get_template(FUNCTION_TEMPLATE)?;

    let mut blocks = Vec::new();
    for (usr, func) in registry.definitions_of(DeclKind::FunctionDecl) {
        blocks.push(template.render(context! { usr => usr, func => func })?);
    }
    Ok(blocks.join("\n"))
}

pub fn write_html(
    registry: &SymbolRegistry,
    templates: &Path,
    path: &Path,
) -> Result<()> {
    let html = render_functions(registry, templates)?;
    fs::write(path, html)?;
    Ok(())
}
