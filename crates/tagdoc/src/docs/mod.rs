//! The documentation extraction engine.
//!
//! [`walker`] traverses provider trees and fills a [`SymbolRegistry`];
//! [`dispatch`] produces the kind-specific payloads, whose types go through
//! [`types::resolve`].

pub mod dispatch;
pub mod registry;
pub mod types;
pub mod walker;

pub use dispatch::{DeclKind, EnumConstant, FieldDescriptor, ParamDescriptor, Payload};
pub use registry::{Definition, FileRecord, SymbolRegistry};
pub use types::TypeDescriptor;
pub use walker::{Extractor, check_diagnostics, walk_translation_unit};

#[cfg(test)]
#[path = "../../tests/src/docs/fake_provider.rs"]
pub(crate) mod fake;
