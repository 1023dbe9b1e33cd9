pub mod ast;
pub mod clang;
pub mod comment;
pub mod config;
pub mod docs;
pub mod error;
pub mod filter;
pub mod output;
pub mod source;

use std::path::PathBuf;

use tracing::info;

pub use ast::{AstProvider, Cursor, CursorKind, Diagnostic, Location, Severity, TranslationUnit, TypeRef};
pub use clang::ClangProvider;
pub use comment::{ParsedComment, parse_comment};
pub use config::Config;
pub use docs::{DeclKind, Definition, Extractor, FileRecord, SymbolRegistry};
pub use error::{Error, Result};
pub use filter::{FileMatch, ProjectScope};

/// What a completed run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub registry: SymbolRegistry,
    pub written: Vec<PathBuf>,
}

/// Parse every configured project path with `provider`, then write the
/// enabled outputs. A fatal diagnostic returns before anything is written.
pub fn run<P: AstProvider>(
    config: &Config,
    provider: P,
) -> Result<RunSummary> {
    let scope = config.scope()?;
    let args = config.compiler_args()?;
    let roots = config.roots();
    info!("Documenting {} ({} path(s))", config.project.name, roots.len());

    let mut extractor = Extractor::new(provider, scope, args);
    extractor.run(&roots)?;
    let registry = extractor.into_registry();
    info!("Collected {} definition(s) from {} file(s)", registry.definitions().len(), registry.files().len());

    let written = output::write_outputs(&registry, &config.output, &config.output_dir(), &config.templates_dir())?;
    Ok(RunSummary { registry, written })
}
