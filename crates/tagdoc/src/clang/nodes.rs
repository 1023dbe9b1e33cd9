use clang_ast::{BareSourceLocation, SourceLocation, SourceRange};
use serde::Deserialize;

pub type Node = clang_ast::Node<Clang>;

/// Typed representation of the Clang AST node kinds the extractor reads.
///
/// Each variant corresponds to a Clang AST node `"kind"` value.
/// The `Other` fallback skips every other node kind.
#[derive(Deserialize)]
pub enum Clang {
    // --- Scopes ---
    TranslationUnitDecl(ScopeData),
    NamespaceDecl(DeclData),
    LinkageSpecDecl(ScopeData),

    // --- Declarations ---
    FunctionDecl(DeclData),
    ParmVarDecl(DeclData),
    VarDecl(DeclData),
    RecordDecl(RecordData),
    CXXRecordDecl(RecordData),
    FieldDecl(DeclData),
    EnumDecl(DeclData),
    EnumConstantDecl(DeclData),
    TypedefDecl(DeclData),
    TypeAliasDecl(DeclData),

    // --- Bodies and constant values ---
    CompoundStmt(ScopeData),
    ConstantExpr(ValueData),
    IntegerLiteral(ValueData),

    // --- Catch-all ---
    // The `loc` and `range` fields MUST be deserialized even for unrecognized
    // node kinds. The `clang-ast` crate tracks "current file" state across the
    // deserialization stream via `SourceLocation`; if we skip locations for
    // nodes that set the file path, all subsequent nodes inherit a stale file.
    #[allow(dead_code)]
    Other {
        #[serde(default)]
        loc: Option<SourceLocation>,
        #[serde(default)]
        range: Option<SourceRange>,
    },
}

/// Nodes that only contain other nodes.
#[derive(Deserialize, Debug)]
pub struct ScopeData {
    pub loc: Option<SourceLocation>,
    pub range: Option<SourceRange>,
}

/// Common data for named declarations.
///
/// `ty` captures Clang's `type` object: `qualType` is the spelling as
/// written, `desugaredQualType` the fully sugar-stripped form when it
/// differs.
#[derive(Deserialize, Debug)]
pub struct DeclData {
    pub name: Option<String>,
    pub loc: Option<SourceLocation>,
    pub range: Option<SourceRange>,
    #[serde(rename = "isImplicit")]
    pub is_implicit: Option<bool>,
    #[serde(rename = "storageClass")]
    pub storage_class: Option<String>,
    #[serde(rename = "type")]
    pub ty: Option<QualType>,
}

/// `RecordDecl` / `CXXRecordDecl`.
#[derive(Deserialize, Debug)]
pub struct RecordData {
    pub name: Option<String>,
    pub loc: Option<SourceLocation>,
    pub range: Option<SourceRange>,
    #[serde(rename = "isImplicit")]
    pub is_implicit: Option<bool>,
    #[serde(rename = "tagUsed")]
    pub tag_used: Option<String>,
    #[serde(rename = "completeDefinition")]
    pub complete_definition: Option<bool>,
}

/// Evaluated constants carry their value as a decimal string.
#[derive(Deserialize, Debug)]
pub struct ValueData {
    pub loc: Option<SourceLocation>,
    pub range: Option<SourceRange>,
    pub value: Option<String>,
}

/// Clang's qualified type representation.
#[derive(Deserialize, Debug)]
pub struct QualType {
    #[serde(rename = "qualType")]
    pub qual_type: Option<String>,
    #[serde(rename = "desugaredQualType")]
    pub desugared_qual_type: Option<String>,
}

impl DeclData {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
    pub fn is_implicit(&self) -> bool {
        self.is_implicit.unwrap_or(false)
    }
    pub fn is_static(&self) -> bool {
        self.storage_class.as_deref() == Some("static")
    }
    pub fn is_extern(&self) -> bool {
        self.storage_class.as_deref() == Some("extern")
    }
    pub fn qual_type(&self) -> Option<&str> {
        self.ty.as_ref().and_then(|t| t.qual_type.as_deref())
    }
    pub fn desugared_qual_type(&self) -> Option<&str> {
        self.ty.as_ref().and_then(|t| t.desugared_qual_type.as_deref())
    }
}

impl RecordData {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
    pub fn is_implicit(&self) -> bool {
        self.is_implicit.unwrap_or(false)
    }
    pub fn is_definition(&self) -> bool {
        self.complete_definition.unwrap_or(false)
    }
}

/// Extract the best concrete source location from a [`SourceLocation`].
///
/// Prefers the expansion location (where a macro was invoked, the position
/// the user sees in their source file) over the spelling location (inside the
/// macro definition).
pub fn resolve_loc(loc: &SourceLocation) -> Option<&BareSourceLocation> {
    loc.expansion_loc.as_ref().or(loc.spelling_loc.as_ref())
}
