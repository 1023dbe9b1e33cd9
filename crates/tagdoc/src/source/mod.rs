//! Source text access: line lookup and comment attachment.

pub mod lexer;

use std::collections::HashMap;
use std::path::Path;

use lexer::{Token, TokenKind, tokenize};
use tracing::debug;

const TRAILING_MARKERS: &[&str] = &["/**<", "/*!<", "///<", "//!<"];

/// A source file held in memory with its token stream.
#[derive(Debug, Clone)]
pub struct SourceFile {
    text: String,
    line_starts: Vec<usize>,
    tokens: Vec<Token>,
}

impl SourceFile {
    pub fn new(text: String) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        let tokens = tokenize(&text);
        Self {
            text,
            line_starts,
            tokens,
        }
    }

    pub fn open(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte offset of a 1-based line and byte column.
    pub fn offset_of(
        &self,
        line: u32,
        column: u32,
    ) -> Option<usize> {
        let start = *self.line_starts.get((line as usize).checked_sub(1)?)?;
        let offset = start + (column as usize).saturating_sub(1);
        (offset <= self.text.len()).then_some(offset)
    }

    /// Text of a 1-based line without its line terminator.
    pub fn line_text(
        &self,
        line: u32,
    ) -> Option<&str> {
        let index = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(index)?;
        let end = self.line_starts.get(index + 1).map_or(self.text.len(), |next| next - 1);
        Some(self.text[start..end].trim_end_matches('\r'))
    }

    /// Documentation comment ending right before the token at `offset`.
    ///
    /// Consecutive `///` or `//!` lines are merged into one comment.
    pub fn doc_comment_before(
        &self,
        offset: usize,
    ) -> Option<String> {
        let index = self.tokens.partition_point(|t| t.span.start < offset);
        let previous = self.tokens[..index].last()?;
        let text = self.token_text(previous);
        if previous.kind != TokenKind::Comment || is_trailing_comment(text) {
            return None;
        }

        if is_block_doc_comment(text) {
            return Some(text.to_owned());
        }
        if !is_line_doc_comment(text) {
            return None;
        }

        let mut first = index - 1;
        while first > 0 {
            let candidate = &self.tokens[first - 1];
            let candidate_text = self.token_text(candidate);
            let gap = &self.text[candidate.span.end..self.tokens[first].span.start];
            if candidate.kind != TokenKind::Comment
                || !is_line_doc_comment(candidate_text)
                || is_trailing_comment(candidate_text)
                || gap.matches('\n').count() > 1
            {
                break;
            }
            first -= 1;
        }

        let lines: Vec<&str> = self.tokens[first..index].iter().map(|t| self.token_text(t)).collect();
        Some(lines.join("\n"))
    }

    /// A `/**<`-style member comment following the token that ends at
    /// `end_offset`, on the same line. One `,` or `;` may sit in between.
    pub fn trailing_doc_comment(
        &self,
        end_offset: usize,
    ) -> Option<String> {
        let mut index = self.tokens.partition_point(|t| t.span.start < end_offset);
        let next = self.tokens.get(index)?;
        if next.kind == TokenKind::Punct && matches!(self.token_text(next), "," | ";") {
            index += 1;
        }
        let comment = self.tokens.get(index)?;
        let text = self.token_text(comment);
        let gap = self.text.get(end_offset..comment.span.start)?;
        if comment.kind == TokenKind::Comment && is_trailing_comment(text) && !gap.contains('\n') {
            Some(text.to_owned())
        } else {
            None
        }
    }

    fn token_text(
        &self,
        token: &Token,
    ) -> &str {
        &self.text[token.span.clone()]
    }
}

/// Source files read on demand, keyed by the path string they were asked for
/// with. Unreadable files are remembered as such.
#[derive(Debug, Default)]
pub struct SourceCache {
    files: HashMap<String, Option<SourceFile>>,
}

impl SourceCache {
    pub fn get(
        &mut self,
        path: &str,
    ) -> Option<&SourceFile> {
        if !self.files.contains_key(path) {
            let file = match SourceFile::open(Path::new(path)) {
                Ok(file) => Some(file),
                Err(e) => {
                    debug!("Cannot read {path}: {e}");
                    None
                },
            };
            self.files.insert(path.to_owned(), file);
        }
        self.files.get(path).and_then(Option::as_ref)
    }

    /// Serve `file` for `path` without touching the filesystem.
    pub fn insert(
        &mut self,
        path: impl Into<String>,
        file: SourceFile,
    ) {
        self.files.insert(path.into(), Some(file));
    }
}

fn is_block_doc_comment(text: &str) -> bool {
    (text.starts_with("/**") || text.starts_with("/*!")) && text != "/**/"
}

fn is_line_doc_comment(text: &str) -> bool {
    (text.starts_with("///") && !text.starts_with("////")) || text.starts_with("//!")
}

fn is_trailing_comment(text: &str) -> bool {
    TRAILING_MARKERS.iter().any(|marker| text.starts_with(marker))
}

#[cfg(test)]
#[path = "../../tests/src/source/source_tests.rs"]
mod tests;
