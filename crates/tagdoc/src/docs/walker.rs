//! Traversal of parsed translation units and the per-file parse step.

use std::path::Path;

use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use super::registry::SymbolRegistry;
use crate::ast::{AstProvider, Cursor, CursorKind, Diagnostic};
use crate::error::{Error, Result};
use crate::filter::ProjectScope;
use crate::source::SourceFile;

/// Walk one translation unit into `registry`.
///
/// In-project definitions (and macros, which are never definitions) are
/// registered without descending into them; other in-project nodes are
/// transparent. The root records its file and is always descended into.
/// Everything else is dropped with its subtree.
pub fn walk_translation_unit<P: AstProvider + ?Sized>(
    root: &Cursor,
    scope: &ProjectScope,
    provider: &P,
    registry: &mut SymbolRegistry,
) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if scope.contains(node.location.as_ref()) {
            if node.is_definition || node.kind == CursorKind::MacroDefinition {
                registry.register(node, scope, provider);
            } else {
                stack.extend(node.children.iter().rev());
            }
        } else if node.kind == CursorKind::TranslationUnit {
            registry.record_translation_unit(node, provider);
            stack.extend(node.children.iter().rev());
        }
    }
}

/// Fail on the first diagnostic above warning level; report documentation
/// warnings along the way.
pub fn check_diagnostics(diagnostics: &[Diagnostic]) -> Result<()> {
    for diagnostic in diagnostics {
        if diagnostic.severity.is_fatal() {
            error!("{diagnostic}");
            return Err(Error::FatalDiagnostic(diagnostic.clone()));
        }
        if diagnostic.is_documentation() {
            report_documentation_warning(diagnostic);
        }
    }
    Ok(())
}

fn report_documentation_warning(diagnostic: &Diagnostic) {
    let line = diagnostic
        .file
        .as_deref()
        .and_then(|file| SourceFile::open(Path::new(file)).ok())
        .and_then(|source| source.line_text(diagnostic.line).map(str::to_owned));

    match line {
        Some(line) => warn!("{line}\n{}^~~ {}", caret_padding(&line, diagnostic.column), diagnostic.message),
        None => warn!("{diagnostic}"),
    }
}

/// Whitespace that lines a caret up under `column` (1-based, in bytes) of
/// `line`, keeping tabs so the alignment survives.
pub(crate) fn caret_padding(
    line: &str,
    column: u32,
) -> String {
    let width = (column as usize).saturating_sub(1);
    line.bytes()
        .take(width)
        .map(|b| if b == b'\t' { '\t' } else { ' ' })
        .chain(std::iter::repeat_n(' ', width.saturating_sub(line.len())))
        .collect()
}

/// Drives a whole documentation run over the configured paths.
pub struct Extractor<P> {
    provider: P,
    scope: ProjectScope,
    args: Vec<String>,
    registry: SymbolRegistry,
}

impl<P: AstProvider> Extractor<P> {
    pub fn new(
        provider: P,
        scope: ProjectScope,
        args: Vec<String>,
    ) -> Self {
        Self {
            provider,
            scope,
            args,
            registry: SymbolRegistry::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn registry(&self) -> &SymbolRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> SymbolRegistry {
        self.registry
    }

    /// Parse every matching file below each path. Directories are walked
    /// recursively in file-name order; plain files are parsed when they match
    /// the pattern set.
    pub fn run<I>(
        &mut self,
        paths: I,
    ) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        for path in paths {
            let path = path.as_ref();
            if path.is_dir() {
                for entry in WalkDir::new(path).sort_by_file_name() {
                    let entry = match entry {
                        Ok(entry) => entry,
                        Err(err) => {
                            warn!("Skipping unreadable entry below {}: {err}", path.display());
                            continue;
                        },
                    };
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    let name = entry.file_name().to_string_lossy();
                    if self.scope.files().matches(&name) {
                        self.parse_file(entry.path())?;
                    }
                }
            } else if self.scope.files().matches(&path.display().to_string()) {
                self.parse_file(path)?;
            } else {
                debug!("Skipping {}: not matched by the file patterns", path.display());
            }
        }
        Ok(())
    }

    /// Parse one source file and walk it. Headers and excluded files are
    /// skipped; returns whether the file was parsed.
    pub fn parse_file(
        &mut self,
        path: &Path,
    ) -> Result<bool> {
        let shown = path.display().to_string();
        if self.scope.files().excluded(&shown) || shown.ends_with(".h") {
            debug!("Skipping {shown}");
            return Ok(false);
        }

        info!("Parsing {shown}");
        let unit = self.provider.parse(path, &self.args)?;
        check_diagnostics(&unit.diagnostics)?;
        walk_translation_unit(&unit.root, &self.scope, &self.provider, &mut self.registry);
        Ok(true)
    }
}

#[cfg(test)]
#[path = "../../tests/src/docs/walker_tests.rs"]
mod tests;
