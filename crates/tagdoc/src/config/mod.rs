//! The `tagdoc.toml` configuration file.
//!
//! One file per section: [`project`], [`output`], [`html`] and [`logging`].
//! Relative paths are resolved against the directory holding the file.

pub mod html;
pub mod logging;
pub mod output;
pub mod project;
pub mod shell;

use std::fs;
use std::path::{Path, PathBuf};

pub use html::{FUNCTION_TEMPLATE, HtmlSettings};
pub use logging::{LogLevel, LoggingSettings};
pub use output::{HTML_FILENAME, JSON_FILENAME, OutputSettings};
pub use project::ProjectSettings;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::filter::ProjectScope;

pub const CONFIG_FILENAME: &str = "tagdoc.toml";

/// Environment variable whose words are appended to the compiler arguments.
pub const CFLAGS_VAR: &str = "CFLAGS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub project: ProjectSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub html: HtmlSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Parse `text` as if it had been read from `path`.
    pub fn parse(
        path: &Path,
        text: &str,
    ) -> Result<Self> {
        let mut config: Config = toml::from_str(text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.project.validate()?;
        config.base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(config)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn roots(&self) -> Vec<PathBuf> {
        self.project.roots(&self.base_dir)
    }

    pub fn scope(&self) -> Result<ProjectScope> {
        self.project.scope(&self.base_dir)
    }

    /// Provider arguments: `extra_args`, then the words of `$CFLAGS`.
    pub fn compiler_args(&self) -> Result<Vec<String>> {
        let cflags = std::env::var(CFLAGS_VAR).ok();
        self.project.compiler_args(cflags.as_deref())
    }

    pub fn output_dir(&self) -> PathBuf {
        self.base_dir.join(&self.output.directory)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.base_dir.join(&self.html.templates)
    }
}

#[cfg(test)]
#[path = "../../tests/src/config/config_tests.rs"]
mod tests;
