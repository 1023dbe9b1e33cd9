//! Writes the finished registry as `result.json` and `index.html`.

mod html;
mod json;

use std::fs;
use std::path::{Path, PathBuf};

pub use html::{render_functions, write_html};
pub use json::{to_json, write_json};
use tracing::info;

use crate::config::{HTML_FILENAME, JSON_FILENAME, OutputSettings};
use crate::docs::SymbolRegistry;
use crate::error::Result;

/// Write the enabled outputs into `directory`, returning the written paths.
pub fn write_outputs(
    registry: &SymbolRegistry,
    settings: &OutputSettings,
    directory: &Path,
    templates: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    if !settings.json && !settings.html {
        return Ok(written);
    }
    fs::create_dir_all(directory)?;

    if settings.json {
        let path = directory.join(JSON_FILENAME);
        write_json(registry, &path)?;
        info!("Wrote {}", path.display());
        written.push(path);
    }
    if settings.html {
        let path = directory.join(HTML_FILENAME);
        write_html(registry, templates, &path)?;
        info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
#[path = "../../tests/src/output/output_tests.rs"]
mod tests;
