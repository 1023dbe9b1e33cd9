//! Macro definitions recovered from `clang -E -dD` output.
//!
//! The JSON AST dump carries no preprocessor record, so macros are found by
//! following the line markers of the preprocessed stream.

use once_cell::sync::Lazy;
use regex::Regex;

static LINE_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^#\s+(\d+)\s+"((?:[^"\\]|\\.)*)""#).expect("valid line marker regex"));

/// A `#define` seen in the preprocessed stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDef {
    pub name: String,
    pub file: String,
    /// 1-based line of the `#define`.
    pub line: u32,
}

pub fn parse_macro_definitions(preprocessed: &str) -> Vec<MacroDef> {
    let mut defs = Vec::new();
    let mut file = String::new();
    let mut line: u32 = 1;

    for text in preprocessed.lines() {
        if let Some(caps) = LINE_MARKER_RE.captures(text)
            && let Ok(number) = caps[1].parse::<u32>()
        {
            line = number;
            file = unescape(&caps[2]);
            continue;
        }

        if let Some(rest) = text.strip_prefix("#define ") {
            let name: String = rest.chars().take_while(|c| c.is_ascii_alphanumeric() || *c == '_').collect();
            if !name.is_empty() && !file.is_empty() {
                defs.push(MacroDef {
                    name,
                    file: file.clone(),
                    line,
                });
            }
        }
        line += 1;
    }

    defs
}

fn unescape(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut chars = path.chars();
    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(next) = chars.next()
        {
            out.push(next);
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src/clang/macros_tests.rs"]
mod tests;
