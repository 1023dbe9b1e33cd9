use serde::Serialize;

use crate::ast::TypeRef;
use crate::filter::ProjectScope;

/// A type as it appears in the output: its spelling, how many pointer levels
/// it has, and the identity of the declaration it names when that
/// declaration belongs to the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDescriptor {
    #[serde(rename = "type")]
    pub usr: Option<String>,
    #[serde(rename = "type_spelling")]
    pub spelling: String,
    pub pointer_depth: usize,
}

/// Unwrap every pointer level, then link the remaining type to its
/// declaration if that declaration is in project. The spelling is always the
/// original one, pointers included.
pub fn resolve(
    ty: &TypeRef,
    scope: &ProjectScope,
) -> TypeDescriptor {
    let mut pointer_depth = 0;
    let mut base = ty;
    while let Some(pointee) = base.pointee() {
        pointer_depth += 1;
        base = pointee;
    }

    let usr = base
        .declaration()
        .filter(|decl| scope.contains(decl.location.as_ref()))
        .and_then(|decl| decl.usr.clone());

    TypeDescriptor {
        usr,
        spelling: ty.spelling.clone(),
        pointer_depth,
    }
}

/// Like [`resolve`], for cursors whose type the provider could not report.
pub fn resolve_opt(
    ty: Option<&TypeRef>,
    scope: &ProjectScope,
) -> TypeDescriptor {
    match ty {
        Some(ty) => resolve(ty, scope),
        None => TypeDescriptor {
            usr: None,
            spelling: String::new(),
            pointer_depth: 0,
        },
    }
}

#[cfg(test)]
#[path = "../../tests/src/docs/types_tests.rs"]
mod tests;
