//! Provider-neutral view of a parsed translation unit.
//!
//! The extraction engine only ever sees [`Cursor`] trees and [`Diagnostic`]s.
//! [`crate::clang::ClangProvider`] builds them from the clang executable;
//! tests build them by hand.

mod diagnostic;

use std::fmt;
use std::path::Path;

use serde::Serialize;

pub use diagnostic::{Diagnostic, Severity};

use crate::error::Result;

/// A 1-based position in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(
        file: impl Into<String>,
        line: u32,
        column: u32,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Node kinds the provider distinguishes. Anything the engine never looks at
/// is folded into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorKind {
    TranslationUnit,
    Namespace,
    LinkageSpec,
    FunctionDecl,
    StructDecl,
    UnionDecl,
    ClassDecl,
    EnumDecl,
    EnumConstantDecl,
    FieldDecl,
    ParmDecl,
    VarDecl,
    TypedefDecl,
    TypeAliasDecl,
    MacroDefinition,
    Other,
}

/// The declaration a type names, as far as the provider could find it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub usr: Option<String>,
    pub location: Option<Location>,
}

/// A type as written at a use site.
///
/// `spelling` is always the full printable type. Pointer types carry their
/// pointee; every other type may carry the declaration it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub spelling: String,
    pub pointee: Option<Box<TypeRef>>,
    pub declaration: Option<TypeDeclaration>,
}

impl TypeRef {
    pub fn named(spelling: impl Into<String>) -> Self {
        Self {
            spelling: spelling.into(),
            pointee: None,
            declaration: None,
        }
    }

    pub fn pointer_to(
        spelling: impl Into<String>,
        pointee: TypeRef,
    ) -> Self {
        Self {
            spelling: spelling.into(),
            pointee: Some(Box::new(pointee)),
            declaration: None,
        }
    }

    pub fn declared_by(
        mut self,
        usr: Option<String>,
        location: Option<Location>,
    ) -> Self {
        self.declaration = Some(TypeDeclaration { usr, location });
        self
    }

    pub fn pointee(&self) -> Option<&TypeRef> {
        self.pointee.as_deref()
    }

    pub fn declaration(&self) -> Option<&TypeDeclaration> {
        self.declaration.as_ref()
    }
}

/// One node of the provider's tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    pub kind: CursorKind,
    pub spelling: String,
    pub usr: Option<String>,
    pub location: Option<Location>,
    pub is_definition: bool,
    pub raw_comment: Option<String>,
    /// Declared type of variables, fields and parameters.
    pub ty: Option<TypeRef>,
    /// Return type of functions.
    pub result_type: Option<TypeRef>,
    /// Fully unwrapped underlying type of typedefs.
    pub canonical_type: Option<TypeRef>,
    pub enum_value: Option<i64>,
    pub children: Vec<Cursor>,
}

impl Cursor {
    pub fn new(
        kind: CursorKind,
        spelling: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            spelling: spelling.into(),
            usr: None,
            location: None,
            is_definition: false,
            raw_comment: None,
            ty: None,
            result_type: None,
            canonical_type: None,
            enum_value: None,
            children: Vec::new(),
        }
    }

    pub fn with_usr(
        mut self,
        usr: impl Into<String>,
    ) -> Self {
        self.usr = Some(usr.into());
        self
    }

    pub fn at(
        mut self,
        location: Location,
    ) -> Self {
        self.location = Some(location);
        self
    }

    pub fn definition(
        mut self,
        is_definition: bool,
    ) -> Self {
        self.is_definition = is_definition;
        self
    }

    pub fn with_comment(
        mut self,
        raw: impl Into<String>,
    ) -> Self {
        self.raw_comment = Some(raw.into());
        self
    }

    pub fn with_type(
        mut self,
        ty: TypeRef,
    ) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn with_result_type(
        mut self,
        ty: TypeRef,
    ) -> Self {
        self.result_type = Some(ty);
        self
    }

    pub fn with_canonical_type(
        mut self,
        ty: TypeRef,
    ) -> Self {
        self.canonical_type = Some(ty);
        self
    }

    pub fn with_enum_value(
        mut self,
        value: i64,
    ) -> Self {
        self.enum_value = Some(value);
        self
    }

    pub fn with_children(
        mut self,
        children: Vec<Cursor>,
    ) -> Self {
        self.children = children;
        self
    }

    /// Formal parameters of a function, in declaration order.
    pub fn arguments(&self) -> impl Iterator<Item = &Cursor> {
        self.children.iter().filter(|c| c.kind == CursorKind::ParmDecl)
    }

    /// Direct fields of a record, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &Cursor> {
        self.children.iter().filter(|c| c.kind == CursorKind::FieldDecl)
    }

    /// Path of the file this cursor lives in. The translation-unit root has
    /// no location and answers with its own spelling.
    pub fn file_name(&self) -> &str {
        match &self.location {
            Some(loc) => &loc.file,
            None => &self.spelling,
        }
    }
}

/// Result of a full semantic parse of one source file.
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    pub root: Cursor,
    pub diagnostics: Vec<Diagnostic>,
}

/// The two-tier contract with whatever parses C for us.
pub trait AstProvider {
    /// Full semantic parse of `path` with the given compiler arguments.
    fn parse(
        &self,
        path: &Path,
        args: &[String],
    ) -> Result<TranslationUnit>;

    /// Lightweight tokenization of `path` alone: the file's first token when
    /// it is a comment.
    fn leading_comment(
        &self,
        path: &Path,
    ) -> Option<String>;
}
