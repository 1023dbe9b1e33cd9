//! Lowering of the clang JSON AST into [`Cursor`] trees.
//!
//! Two passes over the top-level declarations: the first indexes every tag,
//! typedef and alias the translation unit declares (so that type spellings
//! can be linked back to their declarations) and collects doc comments per
//! symbol; the second builds the cursors.

use std::collections::HashMap;
use std::path::Path;

use clang_ast::{BareSourceLocation, SourceLocation, SourceRange};
use tracing::debug;

use super::macros::MacroDef;
use super::nodes::{Clang, DeclData, Node, RecordData, resolve_loc};
use super::types::{self, BaseName};
use super::usr::{self, TagKind};
use crate::ast::{Cursor, CursorKind, Location, TypeRef};
use crate::source::SourceCache;

const MAX_TYPEDEF_DEPTH: usize = 16;

/// Build the cursor tree of one translation unit.
pub fn convert(
    root: &Node,
    tu_path: &Path,
    macros: &[MacroDef],
    sources: &mut SourceCache,
) -> Cursor {
    let mut converter = Converter {
        sources,
        paths: PathCache::default(),
        index: TypeIndex::default(),
        comments: HashMap::new(),
    };

    converter.index_scope(&root.inner, "");
    debug!(
        "[convert] indexed {} tags, {} typedefs in {}",
        converter.index.tags.len(),
        converter.index.typedefs.len(),
        tu_path.display()
    );

    let mut children = converter.convert_scope(&root.inner, "");
    children.extend(macros.iter().map(|def| converter.macro_cursor(def)));

    let spelling = converter.paths.normalize(&tu_path.display().to_string());
    Cursor::new(CursorKind::TranslationUnit, spelling).with_children(children)
}

#[derive(Debug, Clone)]
struct DeclInfo {
    usr: Option<String>,
    location: Option<Location>,
    is_definition: bool,
}

#[derive(Debug)]
struct TypedefInfo {
    decl: DeclInfo,
    underlying: String,
    desugared: Option<String>,
}

/// Declarations a type spelling can name, per translation unit.
#[derive(Debug, Default)]
struct TypeIndex {
    tags: HashMap<(TagKind, String), DeclInfo>,
    typedefs: HashMap<String, TypedefInfo>,
    /// Keyed by clang's own spelling of the position, as printed in
    /// `(unnamed struct at FILE:LINE:COL)`.
    unnamed: HashMap<(String, u32, u32), DeclInfo>,
}

impl TypeIndex {
    fn add_tag(
        &mut self,
        kind: TagKind,
        name: &str,
        info: DeclInfo,
    ) {
        prefer_definition(self.tags.entry((kind, name.to_owned())).or_insert_with(|| info.clone()), info);
    }

    fn add_unnamed(
        &mut self,
        position: (String, u32, u32),
        info: DeclInfo,
    ) {
        prefer_definition(self.unnamed.entry(position).or_insert_with(|| info.clone()), info);
    }

    fn lookup(
        &self,
        spelling: &str,
    ) -> Option<&DeclInfo> {
        match types::base_name(spelling) {
            BaseName::Tag(kind, name) => self.tags.get(&(kind, name.to_owned())),
            BaseName::Unnamed { file, line, column } => self.unnamed.get(&(file.to_owned(), line, column)),
            BaseName::Ident(name) => self.typedefs.get(name).map(|t| &t.decl).or_else(|| {
                [TagKind::Struct, TagKind::Union, TagKind::Enum]
                    .into_iter()
                    .find_map(|kind| self.tags.get(&(kind, name.to_owned())))
            }),
            BaseName::Builtin => None,
        }
    }
}

fn prefer_definition(
    slot: &mut DeclInfo,
    info: DeclInfo,
) {
    if info.is_definition && !slot.is_definition {
        *slot = info;
    }
}

/// clang reports paths the way they were spelled on the command line or in
/// `#include`; locations are keyed by the canonical path instead.
#[derive(Debug, Default)]
struct PathCache {
    normalized: HashMap<String, String>,
}

impl PathCache {
    fn normalize(
        &mut self,
        file: &str,
    ) -> String {
        if let Some(path) = self.normalized.get(file) {
            return path.clone();
        }
        let path = if file.starts_with('<') {
            file.to_owned()
        } else {
            std::fs::canonicalize(file).map(|p| p.display().to_string()).unwrap_or_else(|_| file.to_owned())
        };
        self.normalized.insert(file.to_owned(), path.clone());
        path
    }
}

struct Converter<'a> {
    sources: &'a mut SourceCache,
    paths: PathCache,
    index: TypeIndex,
    /// First doc comment seen for each symbol across its redeclarations.
    comments: HashMap<String, String>,
}

impl Converter<'_> {
    // -----------------------------------------------------------------------
    // First pass
    // -----------------------------------------------------------------------

    fn index_scope(
        &mut self,
        nodes: &[Node],
        scope: &str,
    ) {
        for (i, node) in nodes.iter().enumerate() {
            if is_implicit(node) {
                continue;
            }
            match &node.kind {
                Clang::NamespaceDecl(data) => {
                    let inner = inner_scope(scope, data);
                    self.index_scope(&node.inner, &inner);
                },
                Clang::LinkageSpecDecl(_) => self.index_scope(&node.inner, scope),
                Clang::RecordDecl(data) | Clang::CXXRecordDecl(data) => {
                    let kind = record_tag_kind(data);
                    let is_definition = data.is_definition();
                    self.index_tag(nodes, i, scope, kind, data.name(), data.loc.as_ref(), is_definition);
                    self.index_scope(&node.inner, scope);
                },
                Clang::EnumDecl(data) => {
                    let is_definition = has_enum_constants(node);
                    self.index_tag(nodes, i, scope, TagKind::Enum, data.name(), data.loc.as_ref(), is_definition);
                },
                Clang::TypedefDecl(data) | Clang::TypeAliasDecl(data) => {
                    let Some(name) = data.name() else { continue };
                    let usr = symbol_usr(nodes, i, scope);
                    let location = self.location(data.loc.as_ref());
                    self.remember_comment(usr.as_deref(), data.range.as_ref());
                    self.index.typedefs.entry(name.to_owned()).or_insert(TypedefInfo {
                        decl: DeclInfo {
                            usr,
                            location,
                            is_definition: true,
                        },
                        underlying: data.qual_type().unwrap_or_default().to_owned(),
                        desugared: data.desugared_qual_type().map(str::to_owned),
                    });
                },
                Clang::FunctionDecl(data) => {
                    let usr = symbol_usr(nodes, i, scope);
                    self.remember_comment(usr.as_deref(), data.range.as_ref());
                },
                _ => {},
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn index_tag(
        &mut self,
        nodes: &[Node],
        i: usize,
        scope: &str,
        kind: TagKind,
        name: Option<&str>,
        loc: Option<&SourceLocation>,
        is_definition: bool,
    ) {
        let usr = symbol_usr(nodes, i, scope);
        let info = DeclInfo {
            usr: usr.clone(),
            location: self.location(loc),
            is_definition,
        };

        let typedef_name = naming_typedef(nodes, i);
        if let Some(tag_name) = name.or(typedef_name) {
            self.index.add_tag(kind, tag_name, info.clone());
        }
        if name.is_none()
            && let Some(bare) = loc.and_then(resolve_loc)
        {
            self.index.add_unnamed((bare.file.to_string(), bare.line as u32, bare.col as u32), info);
        }

        let comment = self.own_comment(node_range(&nodes[i]), false).or_else(|| {
            // `typedef struct { ... } name_t;` documents the struct through
            // the typedef.
            typedef_name.and(nodes.get(i + 1)).and_then(|next| self.own_comment(node_range(next), false))
        });
        if let (Some(usr), Some(comment)) = (usr, comment) {
            self.comments.entry(usr).or_insert(comment);
        }
    }

    fn remember_comment(
        &mut self,
        usr: Option<&str>,
        range: Option<&SourceRange>,
    ) {
        let Some(usr) = usr else { return };
        if self.comments.contains_key(usr) {
            return;
        }
        if let Some(comment) = self.own_comment(range, false) {
            self.comments.insert(usr.to_owned(), comment);
        }
    }

    // -----------------------------------------------------------------------
    // Second pass
    // -----------------------------------------------------------------------

    fn convert_scope(
        &mut self,
        nodes: &[Node],
        scope: &str,
    ) -> Vec<Cursor> {
        let mut cursors = Vec::new();
        for i in 0..nodes.len() {
            if let Some(cursor) = self.convert_node(nodes, i, scope) {
                cursors.push(cursor);
            }
        }
        cursors
    }

    fn convert_node(
        &mut self,
        nodes: &[Node],
        i: usize,
        scope: &str,
    ) -> Option<Cursor> {
        let node = &nodes[i];
        if is_implicit(node) {
            return None;
        }

        let cursor = match &node.kind {
            Clang::NamespaceDecl(data) => {
                let inner = inner_scope(scope, data);
                let children = self.convert_scope(&node.inner, &inner);
                Cursor::new(CursorKind::Namespace, data.name().unwrap_or_default()).with_children(children)
            },
            Clang::LinkageSpecDecl(_) => {
                let children = self.convert_scope(&node.inner, scope);
                Cursor::new(CursorKind::LinkageSpec, "").with_children(children)
            },
            Clang::FunctionDecl(data) => {
                let result = types::function_result(data.qual_type().unwrap_or_default());
                let params = node
                    .inner
                    .iter()
                    .filter_map(|child| match &child.kind {
                        Clang::ParmVarDecl(param) => Some(self.variable(CursorKind::ParmDecl, param, false)),
                        _ => None,
                    })
                    .collect();
                let has_body = node.inner.iter().any(|child| matches!(child.kind, Clang::CompoundStmt(_)));
                Cursor::new(CursorKind::FunctionDecl, data.name().unwrap_or_default())
                    .definition(has_body)
                    .with_result_type(self.type_ref(result))
                    .with_children(params)
            },
            Clang::RecordDecl(data) | Clang::CXXRecordDecl(data) => {
                let children = node
                    .inner
                    .iter()
                    .enumerate()
                    .filter_map(|(j, child)| match &child.kind {
                        Clang::FieldDecl(field) => Some(self.variable(CursorKind::FieldDecl, field, true)),
                        Clang::RecordDecl(_) | Clang::CXXRecordDecl(_) | Clang::EnumDecl(_) => {
                            self.convert_node(&node.inner, j, scope)
                        },
                        _ => None,
                    })
                    .collect();
                Cursor::new(record_cursor_kind(data), data.name().unwrap_or_default())
                    .definition(data.is_definition())
                    .with_children(children)
            },
            Clang::EnumDecl(data) => {
                let constants = self.enum_constants(node);
                Cursor::new(CursorKind::EnumDecl, data.name().unwrap_or_default())
                    .definition(!constants.is_empty())
                    .with_children(constants)
            },
            Clang::TypedefDecl(data) => {
                let name = data.name().unwrap_or_default();
                let written = data.qual_type().unwrap_or_default();
                let canonical = self.canonical_spelling(name, written, data.desugared_qual_type());
                Cursor::new(CursorKind::TypedefDecl, name)
                    .definition(true)
                    .with_type(self.type_ref(written))
                    .with_canonical_type(self.type_ref(&canonical))
            },
            Clang::TypeAliasDecl(data) => Cursor::new(CursorKind::TypeAliasDecl, data.name().unwrap_or_default())
                .definition(true)
                .with_type(self.type_ref(data.qual_type().unwrap_or_default())),
            Clang::VarDecl(data) => self.variable(CursorKind::VarDecl, data, false).definition(!data.is_extern()),
            _ => return None,
        };

        let (loc, range) = node_position(node);
        let mut cursor = cursor;
        if let Some(location) = self.location(loc) {
            cursor = cursor.at(location);
        }
        if let Some(usr) = symbol_usr(nodes, i, scope) {
            let comment = self.own_comment(range, false).or_else(|| self.comments.get(&usr).cloned());
            if let Some(comment) = comment {
                cursor = cursor.with_comment(comment);
            }
            cursor = cursor.with_usr(usr);
        }
        Some(cursor)
    }

    /// Parameters, fields and variables: a name, a type and maybe a comment.
    fn variable(
        &mut self,
        kind: CursorKind,
        data: &DeclData,
        member: bool,
    ) -> Cursor {
        let mut cursor =
            Cursor::new(kind, data.name().unwrap_or_default()).with_type(self.type_ref(data.qual_type().unwrap_or_default()));
        if let Some(location) = self.location(data.loc.as_ref()) {
            cursor = cursor.at(location);
        }
        if member && let Some(comment) = self.own_comment(data.range.as_ref(), true) {
            cursor = cursor.with_comment(comment);
        }
        cursor
    }

    fn enum_constants(
        &mut self,
        node: &Node,
    ) -> Vec<Cursor> {
        let mut next_value: i64 = 0;
        let mut constants = Vec::new();
        for child in &node.inner {
            let Clang::EnumConstantDecl(data) = &child.kind else {
                continue;
            };
            let value = explicit_value(child).unwrap_or(next_value);
            next_value = value.wrapping_add(1);

            let mut cursor = Cursor::new(CursorKind::EnumConstantDecl, data.name().unwrap_or_default()).with_enum_value(value);
            if let Some(location) = self.location(data.loc.as_ref()) {
                cursor = cursor.at(location);
            }
            if let Some(comment) = self.own_comment(data.range.as_ref(), true) {
                cursor = cursor.with_comment(comment);
            }
            constants.push(cursor);
        }
        constants
    }

    fn macro_cursor(
        &mut self,
        def: &MacroDef,
    ) -> Cursor {
        let (column, comment) = match self.sources.get(&def.file) {
            Some(source) => (
                source.line_text(def.line).and_then(|text| name_column(text, &def.name)).unwrap_or(1),
                source.offset_of(def.line, 1).and_then(|offset| source.doc_comment_before(offset)),
            ),
            None => (1, None),
        };

        let location = Location::new(self.paths.normalize(&def.file), def.line, column);
        let cursor = Cursor::new(CursorKind::MacroDefinition, def.name.as_str())
            .with_usr(usr::macro_definition(&def.file, &def.name))
            .at(location);
        match comment {
            Some(comment) => cursor.with_comment(comment),
            None => cursor,
        }
    }

    // -----------------------------------------------------------------------
    // Types
    // -----------------------------------------------------------------------

    fn type_ref(
        &self,
        spelling: &str,
    ) -> TypeRef {
        if let Some(inner) = types::pointee(spelling) {
            return TypeRef::pointer_to(spelling, self.type_ref(inner));
        }
        let ty = TypeRef::named(spelling);
        match self.index.lookup(spelling) {
            Some(info) => ty.declared_by(info.usr.clone(), info.location.clone()),
            None => ty,
        }
    }

    /// Follow typedef chains down to the underlying type. `own_name` is the
    /// typedef being described, which must not expand into itself.
    fn canonical_spelling(
        &self,
        own_name: &str,
        written: &str,
        desugared: Option<&str>,
    ) -> String {
        let followed = self.follow_typedefs(own_name, written);
        match desugared {
            Some(desugared) if matches!(types::base_name(types::innermost(&followed)), BaseName::Ident(_)) => {
                self.follow_typedefs(own_name, desugared)
            },
            _ => followed,
        }
    }

    fn follow_typedefs(
        &self,
        own_name: &str,
        spelling: &str,
    ) -> String {
        let mut current = spelling.to_owned();
        for _ in 0..MAX_TYPEDEF_DEPTH {
            let BaseName::Ident(name) = types::base_name(types::innermost(&current)) else {
                break;
            };
            if name == own_name {
                break;
            }
            let Some(typedef) = self.index.typedefs.get(name) else {
                break;
            };
            let underlying = typedef.desugared.as_deref().unwrap_or(&typedef.underlying);
            let next = types::substitute_name(&current, name, underlying);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    // -----------------------------------------------------------------------
    // Source positions
    // -----------------------------------------------------------------------

    fn location(
        &mut self,
        loc: Option<&SourceLocation>,
    ) -> Option<Location> {
        let bare = loc.and_then(resolve_loc).filter(|bare| bare.line > 0 && !bare.file.is_empty())?;
        Some(Location::new(self.paths.normalize(&bare.file), bare.line as u32, bare.col as u32))
    }

    /// The doc comment written at this declaration. Members also accept a
    /// trailing `/**<` comment.
    fn own_comment(
        &mut self,
        range: Option<&SourceRange>,
        member: bool,
    ) -> Option<String> {
        let range = range?;
        let begin = resolve_loc(&range.begin)?;
        let source = self.sources.get(&begin.file)?;
        source.doc_comment_before(begin.offset).or_else(|| {
            let end = resolve_loc(&range.end).filter(|_| member)?;
            source.trailing_doc_comment(end_offset(end))
        })
    }
}

fn end_offset(bare: &BareSourceLocation) -> usize {
    bare.offset + bare.tok_len
}

fn name_column(
    line: &str,
    name: &str,
) -> Option<u32> {
    let after_directive = line.find("define")? + "define".len();
    let start = line[after_directive..].find(name)? + after_directive;
    u32::try_from(start + 1).ok()
}

fn is_implicit(node: &Node) -> bool {
    match &node.kind {
        Clang::RecordDecl(data) | Clang::CXXRecordDecl(data) => data.is_implicit(),
        Clang::NamespaceDecl(data)
        | Clang::FunctionDecl(data)
        | Clang::VarDecl(data)
        | Clang::EnumDecl(data)
        | Clang::TypedefDecl(data)
        | Clang::TypeAliasDecl(data) => data.is_implicit(),
        _ => false,
    }
}

fn node_position(node: &Node) -> (Option<&SourceLocation>, Option<&SourceRange>) {
    match &node.kind {
        Clang::TranslationUnitDecl(data) | Clang::LinkageSpecDecl(data) | Clang::CompoundStmt(data) => {
            (data.loc.as_ref(), data.range.as_ref())
        },
        Clang::NamespaceDecl(data)
        | Clang::FunctionDecl(data)
        | Clang::ParmVarDecl(data)
        | Clang::VarDecl(data)
        | Clang::FieldDecl(data)
        | Clang::EnumDecl(data)
        | Clang::EnumConstantDecl(data)
        | Clang::TypedefDecl(data)
        | Clang::TypeAliasDecl(data) => (data.loc.as_ref(), data.range.as_ref()),
        Clang::RecordDecl(data) | Clang::CXXRecordDecl(data) => (data.loc.as_ref(), data.range.as_ref()),
        Clang::ConstantExpr(data) | Clang::IntegerLiteral(data) => (data.loc.as_ref(), data.range.as_ref()),
        Clang::Other { loc, range } => (loc.as_ref(), range.as_ref()),
    }
}

fn node_range(node: &Node) -> Option<&SourceRange> {
    node_position(node).1
}

fn inner_scope(
    scope: &str,
    data: &DeclData,
) -> String {
    match data.name() {
        Some(name) => usr::namespace_scope(scope, name),
        None => usr::anonymous_namespace_scope(scope),
    }
}

fn record_tag_kind(data: &RecordData) -> TagKind {
    data.tag_used.as_deref().and_then(TagKind::from_keyword).unwrap_or(TagKind::Struct)
}

fn record_cursor_kind(data: &RecordData) -> CursorKind {
    match data.tag_used.as_deref() {
        Some("union") => CursorKind::UnionDecl,
        Some("class") => CursorKind::ClassDecl,
        _ => CursorKind::StructDecl,
    }
}

fn has_enum_constants(node: &Node) -> bool {
    node.inner.iter().any(|child| matches!(child.kind, Clang::EnumConstantDecl(_)))
}

/// An anonymous tag declared inside `typedef ... name;` takes the typedef's
/// name. clang emits the typedef as the tag's next sibling, with a range
/// starting before the tag.
fn naming_typedef(
    nodes: &[Node],
    i: usize,
) -> Option<&str> {
    let tag = node_position(&nodes[i]).0.and_then(resolve_loc)?;
    let Clang::TypedefDecl(typedef) = &nodes.get(i + 1)?.kind else {
        return None;
    };
    let begin = typedef.range.as_ref().and_then(|range| resolve_loc(&range.begin))?;
    if begin.file == tag.file && begin.offset <= tag.offset {
        typedef.name()
    } else {
        None
    }
}

/// Symbol identity of the node at `nodes[i]`, for the kinds that have one.
fn symbol_usr(
    nodes: &[Node],
    i: usize,
    scope: &str,
) -> Option<String> {
    let node = &nodes[i];
    match &node.kind {
        Clang::FunctionDecl(data) => {
            let name = data.name()?;
            let file = data.loc.as_ref().and_then(resolve_loc).map(|bare| &*bare.file);
            let static_in = if data.is_static() { file } else { None };
            Some(usr::function(scope, name, static_in))
        },
        Clang::RecordDecl(data) | Clang::CXXRecordDecl(data) => {
            usr::tag(scope, record_tag_kind(data), data.name(), naming_typedef(nodes, i))
        },
        Clang::EnumDecl(data) => usr::tag(scope, TagKind::Enum, data.name(), naming_typedef(nodes, i))
            .or_else(|| first_enumerator(node).map(|first| usr::anonymous_enum(scope, first))),
        Clang::TypedefDecl(data) => {
            let name = data.name()?;
            let file = data.loc.as_ref().and_then(resolve_loc).map(|bare| &*bare.file).unwrap_or_default();
            Some(usr::typedef(scope, file, name))
        },
        Clang::TypeAliasDecl(data) => Some(usr::type_alias(scope, data.name()?)),
        _ => None,
    }
}

fn first_enumerator(node: &Node) -> Option<&str> {
    node.inner.iter().find_map(|child| match &child.kind {
        Clang::EnumConstantDecl(data) => data.name(),
        _ => None,
    })
}

/// Value of an explicit enumerator initializer, as evaluated by clang.
fn explicit_value(node: &Node) -> Option<i64> {
    for child in &node.inner {
        let value = match &child.kind {
            Clang::ConstantExpr(data) | Clang::IntegerLiteral(data) => data.value.as_deref().and_then(parse_integer),
            _ => None,
        };
        if let Some(value) = value.or_else(|| explicit_value(child)) {
            return Some(value);
        }
    }
    None
}

fn parse_integer(text: &str) -> Option<i64> {
    text.parse::<i64>().ok().or_else(|| text.parse::<u64>().ok().map(|v| v as i64))
}

#[cfg(test)]
#[path = "../../tests/src/clang/convert_tests.rs"]
mod tests;
