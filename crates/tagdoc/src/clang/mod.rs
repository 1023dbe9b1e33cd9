//! [`AstProvider`] backed by the `clang` executable.
//!
//! A parse runs clang twice: once for the JSON AST dump and its diagnostics,
//! once as a preprocessor to recover macro definitions. The dump is lowered
//! into [`Cursor`](crate::ast::Cursor) trees by [`convert`].

mod compiler;
mod convert;
mod macros;
mod nodes;
mod types;
mod usr;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::ast::{AstProvider, Cursor, CursorKind, TranslationUnit};
use crate::error::{Error, Result};
use crate::source::{SourceCache, lexer};

const DEFAULT_PROGRAM: &str = "clang";

/// Drives a clang binary. System include paths are discovered once, when the
/// provider is created with [`ClangProvider::discover`].
#[derive(Debug, Clone)]
pub struct ClangProvider {
    program: String,
    system_args: Vec<String>,
}

impl Default for ClangProvider {
    fn default() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }
}

impl ClangProvider {
    /// A provider for `program` without system include discovery.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            system_args: Vec::new(),
        }
    }

    /// A provider for `program` that passes clang's default system include
    /// directories explicitly, as `-isystem` flags.
    pub fn discover(program: impl Into<String>) -> Self {
        let program = program.into();
        let system_args = compiler::discover_system_includes(&program);
        Self { program, system_args }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Full argument list for one parse: documentation warnings, system
    /// includes, then the caller's flags.
    pub fn arguments(
        &self,
        args: &[String],
    ) -> Vec<String> {
        let mut all = Vec::with_capacity(1 + self.system_args.len() + args.len());
        all.push("-Wdocumentation".to_string());
        all.extend(self.system_args.iter().cloned());
        all.extend(args.iter().cloned());
        all
    }
}

impl AstProvider for ClangProvider {
    fn parse(
        &self,
        path: &Path,
        args: &[String],
    ) -> Result<TranslationUnit> {
        let args = self.arguments(args);
        let dump = compiler::run_ast_dump(&self.program, path, &args)?;

        if dump.diagnostics.iter().any(|d| d.severity.is_fatal()) {
            debug!("[parse] fatal diagnostics for {}, skipping AST decode", path.display());
            return Ok(TranslationUnit {
                root: Cursor::new(CursorKind::TranslationUnit, path.display().to_string()),
                diagnostics: dump.diagnostics,
            });
        }
        if dump.json.trim().is_empty() {
            return Err(Error::EmptyAst {
                path: path.to_path_buf(),
            });
        }

        let root: nodes::Node = serde_json::from_str(&dump.json).map_err(|source| Error::AstDecode {
            path: path.to_path_buf(),
            source,
        })?;
        let macros = macros::parse_macro_definitions(&compiler::run_preprocessor(&self.program, path, &args)?);

        let mut sources = SourceCache::default();
        let root = convert::convert(&root, path, &macros, &mut sources);
        debug!("[parse] {} top-level cursors in {}", root.children.len(), path.display());

        Ok(TranslationUnit {
            root,
            diagnostics: dump.diagnostics,
        })
    }

    fn leading_comment(
        &self,
        path: &Path,
    ) -> Option<String> {
        let text = fs::read_to_string(path)
            .map_err(|e| debug!("[leading-comment] cannot read {}: {e}", path.display()))
            .ok()?;
        lexer::leading_comment(&text).map(str::to_owned)
    }
}

#[cfg(test)]
#[path = "../../tests/src/clang/provider_tests.rs"]
mod tests;
