use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, de};

use super::shell;
use crate::error::{Error, Result};
use crate::filter::{FileMatch, ProjectScope};

/// The `[project]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectSettings {
    pub name: String,
    /// Project roots, relative to the configuration file.
    #[serde(deserialize_with = "word_list")]
    pub path: Vec<String>,
    /// Include globs.
    #[serde(deserialize_with = "word_list")]
    pub files: Vec<String>,
    #[serde(default, deserialize_with = "word_list")]
    pub exclude: Vec<String>,
    /// Forwarded verbatim to the AST provider.
    #[serde(default, deserialize_with = "word_list")]
    pub extra_args: Vec<String>,
}

/// A list setting written either as one shell-quoted string or as an array.
#[derive(Deserialize)]
#[serde(untagged)]
enum WordList {
    Line(String),
    Words(Vec<String>),
}

fn word_list<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<String>, D::Error> {
    match WordList::deserialize(deserializer)? {
        WordList::Line(line) => {
            shell::split(&line).ok_or_else(|| de::Error::custom(format!("unbalanced quoting in `{line}`")))
        },
        WordList::Words(words) => Ok(words),
    }
}

impl ProjectSettings {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("project.name must not be empty".to_owned()));
        }
        if self.path.is_empty() {
            return Err(Error::Config("project.path must name at least one directory".to_owned()));
        }
        if self.files.is_empty() {
            return Err(Error::Config("project.files must name at least one pattern".to_owned()));
        }
        Ok(())
    }

    /// Roots resolved against `base`, canonicalized when they exist.
    pub fn roots(
        &self,
        base: &Path,
    ) -> Vec<PathBuf> {
        self.path
            .iter()
            .map(|p| {
                let joined = base.join(p);
                fs::canonicalize(&joined).unwrap_or(joined)
            })
            .collect()
    }

    pub fn file_match(&self) -> Result<FileMatch> {
        FileMatch::new(&self.files, &self.exclude)
    }

    pub fn scope(
        &self,
        base: &Path,
    ) -> Result<ProjectScope> {
        Ok(ProjectScope::new(self.roots(base), self.file_match()?))
    }

    /// `extra_args` followed by the words of `cflags`.
    pub fn compiler_args(
        &self,
        cflags: Option<&str>,
    ) -> Result<Vec<String>> {
        let mut args = self.extra_args.clone();
        if let Some(cflags) = cflags {
            let words =
                shell::split(cflags).ok_or_else(|| Error::Config(format!("unbalanced quoting in CFLAGS `{cflags}`")))?;
            args.extend(words);
        }
        Ok(args)
    }
}
