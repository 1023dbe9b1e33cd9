//! The project-wide symbol table and per-file index.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use super::dispatch::{self, DeclKind, Payload};
use crate::ast::{AstProvider, Cursor, Location};
use crate::comment::{ParsedComment, parse_comment};
use crate::filter::ProjectScope;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<ParsedComment>,
    /// Symbol identities declared in the file, per kind, in registration
    /// order.
    pub definitions: BTreeMap<DeclKind, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition {
    pub kind: DeclKind,
    pub spelling: String,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<ParsedComment>,
    #[serde(flatten)]
    pub payload: Option<Payload>,
}

/// Insert-only map from symbol identity to definition. The first observation
/// of an identity wins; later ones never touch the stored record.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SymbolRegistry {
    files: BTreeMap<String, FileRecord>,
    definitions: BTreeMap<String, Definition>,
}

impl SymbolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &BTreeMap<String, FileRecord> {
        &self.files
    }

    pub fn definitions(&self) -> &BTreeMap<String, Definition> {
        &self.definitions
    }

    pub fn file(
        &self,
        path: &str,
    ) -> Option<&FileRecord> {
        self.files.get(path)
    }

    pub fn definition(
        &self,
        usr: &str,
    ) -> Option<&Definition> {
        self.definitions.get(usr)
    }

    /// Definitions of one kind, in identity order.
    pub fn definitions_of(
        &self,
        kind: DeclKind,
    ) -> impl Iterator<Item = (&str, &Definition)> {
        self.definitions.iter().filter(move |(_, def)| def.kind == kind).map(|(usr, def)| (usr.as_str(), def))
    }

    /// Record `cursor` as a definition. Returns whether a new record was
    /// created; cursors without an identity, of an undocumented kind, or
    /// already registered are ignored.
    pub fn register<P: AstProvider + ?Sized>(
        &mut self,
        cursor: &Cursor,
        scope: &ProjectScope,
        provider: &P,
    ) -> bool {
        let Some(kind) = DeclKind::from_cursor(cursor.kind) else {
            return false;
        };
        let Some(usr) = cursor.usr.as_deref() else {
            return false;
        };
        if self.definitions.contains_key(usr) {
            debug!("[registry] {usr} already recorded, ignoring redeclaration");
            return false;
        }
        let Some(location) = cursor.location.clone() else {
            return false;
        };

        self.file_entry(&location.file, provider).definitions.entry(kind).or_default().push(usr.to_owned());

        let comment = cursor.raw_comment.as_deref().map(|raw| parse_comment(&location.to_string(), raw));
        let payload = dispatch::extract(kind, cursor, scope);
        debug!("[registry] {} {} as {usr}", kind.as_str(), cursor.spelling);
        self.definitions.insert(
            usr.to_owned(),
            Definition {
                kind,
                spelling: cursor.spelling.clone(),
                location,
                comment,
                payload,
            },
        );
        true
    }

    /// Record the file a translation unit was parsed from, with its leading
    /// comment.
    pub fn record_translation_unit<P: AstProvider + ?Sized>(
        &mut self,
        root: &Cursor,
        provider: &P,
    ) {
        let file = root.file_name();
        let comment = provider.leading_comment(Path::new(file)).map(|raw| parse_comment(file, &raw));
        let record = self.files.entry(file.to_owned()).or_default();
        if comment.is_some() {
            record.comment = comment;
        }
    }

    /// The record of `file`, created on first sight. A new record asks the
    /// provider for the file's leading comment.
    fn file_entry<P: AstProvider + ?Sized>(
        &mut self,
        file: &str,
        provider: &P,
    ) -> &mut FileRecord {
        self.files.entry(file.to_owned()).or_insert_with(|| FileRecord {
            comment: provider.leading_comment(Path::new(file)).map(|raw| parse_comment(file, &raw)),
            definitions: BTreeMap::new(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/src/docs/registry_tests.rs"]
mod tests;
