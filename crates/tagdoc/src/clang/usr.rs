//! Unified Symbol Resolution strings in clang's `c:` scheme.
//!
//! The JSON AST dump identifies nodes by per-process pointer ids, which are
//! useless across translation units. These strings are stable: the same
//! function seen from two source files yields the same identity.

use std::path::Path;

/// Tag namespace of a record or enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Struct,
    Union,
    Enum,
}

impl TagKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "struct" | "class" => Some(Self::Struct),
            "union" => Some(Self::Union),
            "enum" => Some(Self::Enum),
            _ => None,
        }
    }

    fn marker(self) -> &'static str {
        match self {
            Self::Struct => "S",
            Self::Union => "U",
            Self::Enum => "E",
        }
    }

    fn anonymous_marker(self) -> &'static str {
        match self {
            Self::Struct => "SA",
            Self::Union => "UA",
            Self::Enum => "EA",
        }
    }
}

fn file_component(file: &str) -> &str {
    Path::new(file).file_name().and_then(|name| name.to_str()).unwrap_or(file)
}

/// Scope prefix for declarations nested in a namespace (`@N@ns`).
pub fn namespace_scope(
    outer: &str,
    name: &str,
) -> String {
    format!("{outer}@N@{name}")
}

pub fn anonymous_namespace_scope(outer: &str) -> String {
    format!("{outer}@aN")
}

/// Named tags get `c:@S@name`; an anonymous tag is only identifiable through
/// the typedef that names it.
pub fn tag(
    scope: &str,
    kind: TagKind,
    name: Option<&str>,
    typedef_name: Option<&str>,
) -> Option<String> {
    match (name, typedef_name) {
        (Some(name), _) => Some(format!("c:{scope}@{}@{name}", kind.marker())),
        (None, Some(alias)) => Some(format!("c:{scope}@{}@{alias}", kind.anonymous_marker())),
        (None, None) => None,
    }
}

/// An enum with neither a name nor a naming typedef is identified by its
/// first enumerator (`c:@Ea@FIRST`).
pub fn anonymous_enum(
    scope: &str,
    first_constant: &str,
) -> String {
    format!("c:{scope}@Ea@{first_constant}")
}

/// Functions with internal linkage are qualified by their file.
pub fn function(
    scope: &str,
    name: &str,
    static_in: Option<&str>,
) -> String {
    match static_in {
        Some(file) => format!("c:{}@F@{name}", file_component(file)),
        None => format!("c:{scope}@F@{name}"),
    }
}

pub fn typedef(
    scope: &str,
    file: &str,
    name: &str,
) -> String {
    if scope.is_empty() {
        format!("c:{}@T@{name}", file_component(file))
    } else {
        format!("c:{scope}@T@{name}")
    }
}

pub fn type_alias(
    scope: &str,
    name: &str,
) -> String {
    format!("c:{scope}@A@{name}")
}

pub fn macro_definition(
    file: &str,
    name: &str,
) -> String {
    format!("c:{}@macro@{name}", file_component(file))
}

#[cfg(test)]
#[path = "../../tests/src/clang/usr_tests.rs"]
mod tests;
