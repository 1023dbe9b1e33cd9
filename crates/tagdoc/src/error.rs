use std::path::PathBuf;

use thiserror::Error;

use crate::ast::Diagnostic;

/// Errors that abort a documentation run.
///
/// Comment-markup anomalies, documentation warnings and unresolvable type
/// references are never represented here; they are logged and skipped.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Config(String),

    #[error("glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("AST dump for {path} produced no usable JSON")]
    EmptyAst { path: PathBuf },

    #[error("failed to decode AST for {path}: {source}")]
    AstDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("fatal diagnostic: {0}")]
    FatalDiagnostic(Diagnostic),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
