//! Reading clang's printed type spellings.

use super::usr::TagKind;

const QUALIFIERS: &[&str] = &["const", "volatile", "restrict", "__restrict", "_Atomic"];

const BUILTIN_WORDS: &[&str] = &[
    "void", "char", "short", "int", "long", "float", "double", "signed", "unsigned", "_Bool", "bool",
    "_Complex", "__int128", "wchar_t", "char8_t", "char16_t", "char32_t", "auto",
];

/// What a non-pointer type spelling names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseName<'a> {
    Tag(TagKind, &'a str),
    /// clang's `struct (unnamed struct at FILE:LINE:COL)` form.
    Unnamed {
        file: &'a str,
        line: u32,
        column: u32,
    },
    Ident(&'a str),
    Builtin,
}

fn strip_trailing_qualifiers(mut spelling: &str) -> &str {
    loop {
        let trimmed = spelling.trim_end();
        let stripped = QUALIFIERS.iter().find_map(|q| {
            trimmed.strip_suffix(q).filter(|rest| rest.is_empty() || rest.ends_with([' ', '*']))
        });
        match stripped {
            Some(rest) => spelling = rest,
            None => return trimmed,
        }
    }
}

fn strip_leading_qualifiers(mut spelling: &str) -> &str {
    loop {
        let trimmed = spelling.trim_start();
        let stripped = QUALIFIERS.iter().find_map(|q| trimmed.strip_prefix(q).filter(|rest| rest.starts_with(' ')));
        match stripped {
            Some(rest) => spelling = rest,
            None => return trimmed,
        }
    }
}

/// For a pointer spelling (`struct widget *const`), the pointee spelling
/// (`struct widget`). The result is always a prefix of the input.
pub fn pointee(spelling: &str) -> Option<&str> {
    let stripped = strip_trailing_qualifiers(spelling);
    let rest = stripped.strip_suffix('*')?;
    let rest = rest.trim_end();
    (!rest.is_empty()).then_some(rest)
}

/// Strip every pointer level: `struct widget` for `struct widget **`.
pub fn innermost(spelling: &str) -> &str {
    let mut current = spelling;
    while let Some(inner) = pointee(current) {
        current = inner;
    }
    current
}

/// Classify the name a non-pointer spelling refers to.
pub fn base_name(spelling: &str) -> BaseName<'_> {
    let core = strip_trailing_qualifiers(strip_leading_qualifiers(spelling));

    if let Some((keyword, rest)) = core.split_once(' ')
        && let Some(kind) = TagKind::from_keyword(keyword)
    {
        let rest = rest.trim();
        let rest = rest.rsplit("::").next().unwrap_or(rest);
        if rest.starts_with('(') {
            return parse_unnamed(rest).unwrap_or(BaseName::Builtin);
        }
        return if is_identifier(rest) {
            BaseName::Tag(kind, rest)
        } else {
            BaseName::Builtin
        };
    }

    let unqualified = core.rsplit("::").next().unwrap_or(core);
    if is_identifier(unqualified) && !BUILTIN_WORDS.contains(&unqualified) {
        BaseName::Ident(unqualified)
    } else {
        BaseName::Builtin
    }
}

fn parse_unnamed(text: &str) -> Option<BaseName<'_>> {
    let inner = text.strip_prefix('(')?.strip_suffix(')')?;
    let (_, position) = inner.rsplit_once(" at ")?;
    let mut parts = position.rsplitn(3, ':');
    let column = parts.next()?.parse().ok()?;
    let line = parts.next()?.parse().ok()?;
    let file = parts.next()?;
    Some(BaseName::Unnamed { file, line, column })
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Result type of a function type spelling: everything before the trailing
/// parameter list, e.g. `int` in `int (struct widget *, int)`.
pub fn function_result(spelling: &str) -> &str {
    let trimmed = spelling.trim_end();
    if !trimmed.ends_with(')') {
        return trimmed;
    }
    let mut depth = 0usize;
    for (index, c) in trimmed.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return trimmed[..index].trim_end();
                }
            },
            _ => {},
        }
    }
    trimmed
}

/// Replace the identifier `name` inside `spelling` with `replacement`,
/// keeping surrounding qualifiers.
pub fn substitute_name(
    spelling: &str,
    name: &str,
    replacement: &str,
) -> String {
    let mut search_from = 0;
    while let Some(found) = spelling[search_from..].find(name) {
        let start = search_from + found;
        let end = start + name.len();
        let before_ok = spelling[..start].chars().next_back().is_none_or(|c| !is_ident_char(c));
        let after_ok = spelling[end..].chars().next().is_none_or(|c| !is_ident_char(c));
        if before_ok && after_ok {
            return format!("{}{}{}", &spelling[..start], replacement, &spelling[end..]);
        }
        search_from = end;
    }
    spelling.to_owned()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
#[path = "../../tests/src/clang/types_tests.rs"]
mod tests;
