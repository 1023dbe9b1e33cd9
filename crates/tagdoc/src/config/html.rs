use std::path::PathBuf;

use serde::Deserialize;

pub const FUNCTION_TEMPLATE: &str = "function.html";

/// The `[html]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HtmlSettings {
    /// Template directory, relative to the configuration file.
    pub templates: PathBuf,
}

impl Default for HtmlSettings {
    fn default() -> Self {
        Self {
            templates: PathBuf::from("./templates"),
        }
    }
}
