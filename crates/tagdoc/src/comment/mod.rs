//! Tag-based comment markup.
//!
//! A raw comment becomes a [`ParsedComment`]: free text lines form the
//! brief, `@param name description` lines fill `params`, and any other
//! `@key value` line becomes a tag.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use tracing::warn;

const LEADING_DELIMITERS: &[char] = &['/', '*', '<', '!', ' ', '\t', '\r'];
const TRAILING_DELIMITERS: &[char] = &['*', '/', ' ', '\t', '\r'];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedComment {
    pub brief: Option<String>,
    pub tags: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
}

impl ParsedComment {
    pub fn is_empty(&self) -> bool {
        self.brief.is_none() && self.tags.is_empty() && self.params.is_empty()
    }

    pub fn tag(
        &self,
        key: &str,
    ) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn param(
        &self,
        name: &str,
    ) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// A repeated parameter keeps its first description.
    fn add_param(
        &mut self,
        context: &str,
        name: &str,
        description: &str,
    ) {
        if self.params.contains_key(name) {
            warn!("In {context}, param {name} already documented.");
            return;
        }
        self.params.insert(name.to_owned(), description.to_owned());
    }

    /// A repeated tag replaces the earlier value.
    fn add_tag(
        &mut self,
        context: &str,
        full_line: &str,
        key: &str,
        value: &str,
    ) {
        if self.tags.contains_key(key) {
            warn!("{}\n^~~ In {context}, {key} already documented.", full_line.trim_end());
        }
        self.tags.insert(key.to_owned(), value.to_owned());
    }
}

/// Parse one raw comment, delimiters included.
///
/// `context` names where the comment came from and only shows up in
/// warnings.
pub fn parse_comment(
    context: &str,
    raw: &str,
) -> ParsedComment {
    let mut comment = ParsedComment::default();
    let mut brief: Vec<&str> = Vec::new();

    for full_line in raw.split('\n') {
        let line = full_line.trim_start_matches(LEADING_DELIMITERS).trim_end_matches(TRAILING_DELIMITERS);
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("@param") {
            // Malformed @param lines are already reported by -Wdocumentation.
            if let Some((name, description)) = split_first_word(rest) {
                comment.add_param(context, name, description.trim());
            }
        } else if let Some(rest) = line.strip_prefix('@') {
            match split_first_word(rest) {
                Some((key, value)) => comment.add_tag(context, full_line, key, value),
                None => {
                    warn!("{}\n^~~ Could not extract value from: {line}", full_line.trim_end());
                },
            }
        } else {
            brief.push(line);
        }
    }

    if !brief.is_empty() {
        comment.brief = Some(brief.join("\n"));
    }
    comment
}

/// Split on the first run of whitespace. Both halves must be non-empty.
fn split_first_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start();
    let split_at = text.find(char::is_whitespace)?;
    let (head, tail) = text.split_at(split_at);
    let tail = tail.trim_start();
    if tail.is_empty() {
        None
    } else {
        Some((head, tail))
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Entry<'a> {
    Text(&'a str),
    Params(&'a BTreeMap<String, String>),
}

/// Tags are emitted as top-level keys next to `brief` and `params`.
impl Serialize for ParsedComment {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut entries: BTreeMap<&str, Entry<'_>> =
            self.tags.iter().map(|(key, value)| (key.as_str(), Entry::Text(value))).collect();
        if let Some(brief) = &self.brief {
            entries.insert("brief", Entry::Text(brief));
        }
        if !self.params.is_empty() {
            entries.insert("params", Entry::Params(&self.params));
        }
        serializer.collect_map(entries)
    }
}

#[cfg(test)]
#[path = "../../tests/src/comment/comment_tests.rs"]
mod tests;
