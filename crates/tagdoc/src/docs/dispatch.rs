//! Per-kind extraction of definition payloads.
//!
//! [`DeclKind`] is the closed set of documented declaration kinds and
//! [`extract`] the single place that decides what each one contributes.

use serde::Serialize;

use super::types::{TypeDescriptor, resolve_opt};
use crate::ast::{Cursor, CursorKind};
use crate::comment::{ParsedComment, parse_comment};
use crate::filter::ProjectScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeclKind {
    TypeAliasDecl,
    MacroDefinition,
    TypedefDecl,
    EnumDecl,
    UnionDecl,
    FunctionDecl,
    StructDecl,
}

impl DeclKind {
    pub fn from_cursor(kind: CursorKind) -> Option<Self> {
        match kind {
            CursorKind::TypeAliasDecl => Some(Self::TypeAliasDecl),
            CursorKind::MacroDefinition => Some(Self::MacroDefinition),
            CursorKind::TypedefDecl => Some(Self::TypedefDecl),
            CursorKind::EnumDecl => Some(Self::EnumDecl),
            CursorKind::UnionDecl => Some(Self::UnionDecl),
            CursorKind::FunctionDecl => Some(Self::FunctionDecl),
            CursorKind::StructDecl => Some(Self::StructDecl),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TypeAliasDecl => "TYPE_ALIAS_DECL",
            Self::MacroDefinition => "MACRO_DEFINITION",
            Self::TypedefDecl => "TYPEDEF_DECL",
            Self::EnumDecl => "ENUM_DECL",
            Self::UnionDecl => "UNION_DECL",
            Self::FunctionDecl => "FUNCTION_DECL",
            Self::StructDecl => "STRUCT_DECL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamDescriptor {
    #[serde(flatten)]
    pub ty: TypeDescriptor,
    pub spelling: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    #[serde(flatten)]
    pub ty: TypeDescriptor,
    pub spelling: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<ParsedComment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumConstant {
    pub spelling: String,
    pub value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<ParsedComment>,
}

/// Kind-specific part of a definition, flattened into it on output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Function {
        params: Vec<ParamDescriptor>,
        result: TypeDescriptor,
    },
    Record {
        fields: Vec<FieldDescriptor>,
    },
    Enum {
        fields: Vec<EnumConstant>,
    },
    Typedef {
        canonical: TypeDescriptor,
    },
}

pub fn extract(
    kind: DeclKind,
    cursor: &Cursor,
    scope: &ProjectScope,
) -> Option<Payload> {
    match kind {
        DeclKind::FunctionDecl => Some(function(cursor, scope)),
        DeclKind::StructDecl | DeclKind::UnionDecl => Some(record(cursor, scope)),
        DeclKind::EnumDecl => Some(enumeration(cursor)),
        DeclKind::TypedefDecl => Some(typedef(cursor, scope)),
        DeclKind::TypeAliasDecl | DeclKind::MacroDefinition => None,
    }
}

fn function(
    cursor: &Cursor,
    scope: &ProjectScope,
) -> Payload {
    let params = cursor
        .arguments()
        .map(|param| ParamDescriptor {
            ty: resolve_opt(param.ty.as_ref(), scope),
            spelling: param.spelling.clone(),
        })
        .collect();
    Payload::Function {
        params,
        result: resolve_opt(cursor.result_type.as_ref(), scope),
    }
}

fn record(
    cursor: &Cursor,
    scope: &ProjectScope,
) -> Payload {
    let fields = cursor
        .fields()
        .map(|field| FieldDescriptor {
            ty: resolve_opt(field.ty.as_ref(), scope),
            spelling: field.spelling.clone(),
            comment: member_comment(field),
        })
        .collect();
    Payload::Record { fields }
}

fn enumeration(cursor: &Cursor) -> Payload {
    let fields = cursor
        .children
        .iter()
        .filter(|child| child.kind == CursorKind::EnumConstantDecl)
        .map(|constant| EnumConstant {
            spelling: constant.spelling.clone(),
            value: constant.enum_value.unwrap_or_default(),
            comment: member_comment(constant),
        })
        .collect();
    Payload::Enum { fields }
}

fn typedef(
    cursor: &Cursor,
    scope: &ProjectScope,
) -> Payload {
    Payload::Typedef {
        canonical: resolve_opt(cursor.canonical_type.as_ref(), scope),
    }
}

fn member_comment(member: &Cursor) -> Option<ParsedComment> {
    let raw = member.raw_comment.as_deref()?;
    let context = member.location.as_ref().map_or_else(|| member.spelling.clone(), ToString::to_string);
    Some(parse_comment(&context, raw))
}

#[cfg(test)]
#[path = "../../tests/src/docs/dispatch_tests.rs"]
mod tests;
