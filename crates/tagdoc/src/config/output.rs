use std::path::PathBuf;

use serde::Deserialize;

pub const JSON_FILENAME: &str = "result.json";
pub const HTML_FILENAME: &str = "index.html";

/// The `[output]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub json: bool,
    pub html: bool,
    /// Where the output files go, relative to the configuration file.
    pub directory: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            json: true,
            html: true,
            directory: PathBuf::from("."),
        }
    }
}
