//! Decides which files and locations belong to the documented project.

use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::ast::Location;
use crate::error::Result;

/// Include/exclude glob sets with fnmatch semantics.
///
/// A pattern applies to a path when it matches the whole path or the path's
/// final component.
#[derive(Debug, Clone, Default)]
pub struct FileMatch {
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
}

impl FileMatch {
    pub fn new<I, E>(
        includes: I,
        excludes: E,
    ) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Ok(Self {
            includes: compile(includes)?,
            excludes: compile(excludes)?,
        })
    }

    /// True when the path hits any exclude pattern, whatever the includes say.
    pub fn excluded(
        &self,
        path: &str,
    ) -> bool {
        self.excludes.iter().any(|pattern| pattern_applies(pattern, path))
    }

    /// True when the path hits an include pattern and no exclude pattern.
    pub fn matches(
        &self,
        path: &str,
    ) -> bool {
        self.includes.iter().any(|pattern| pattern_applies(pattern, path)) && !self.excluded(path)
    }
}

fn compile<P>(patterns: P) -> Result<Vec<Pattern>>
where
    P: IntoIterator,
    P::Item: AsRef<str>,
{
    patterns.into_iter().map(|p| Ok(Pattern::new(p.as_ref())?)).collect()
}

fn pattern_applies(
    pattern: &Pattern,
    path: &str,
) -> bool {
    if pattern.matches(path) {
        return true;
    }
    Path::new(path).file_name().and_then(|name| name.to_str()).is_some_and(|name| pattern.matches(name))
}

/// Project roots plus the pattern set: the full "in project" test.
#[derive(Debug, Clone)]
pub struct ProjectScope {
    roots: Vec<PathBuf>,
    files: FileMatch,
}

impl ProjectScope {
    pub fn new(
        roots: Vec<PathBuf>,
        files: FileMatch,
    ) -> Self {
        Self { roots, files }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn files(&self) -> &FileMatch {
        &self.files
    }

    /// A file is in the project when it lives under a root and matches the
    /// pattern set. Both are required.
    pub fn contains_file(
        &self,
        file: &str,
    ) -> bool {
        if file.is_empty() {
            return false;
        }
        let path = Path::new(file);
        self.roots.iter().any(|root| path.starts_with(root)) && self.files.matches(file)
    }

    pub fn contains(
        &self,
        location: Option<&Location>,
    ) -> bool {
        location.is_some_and(|loc| self.contains_file(&loc.file))
    }
}

#[cfg(test)]
#[path = "../../tests/src/filter/filter_tests.rs"]
mod tests;
