use std::ops::Range;

use logos::Logos;

/// Just enough of C's lexical grammar to find comments reliably: strings
/// and character literals are recognized so comment markers inside them
/// are not mistaken for comments.
#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
#[logos(error = ())]
pub enum TokenKind {
    #[regex(r"[ \t\r\n\f\v]+")]
    Whitespace,

    #[regex(r"//.*", allow_greedy = true)]
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    Comment,

    #[regex(r"#[ \t]*[A-Za-z_]+")]
    Directive,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r"[0-9][0-9A-Za-z_.]*")]
    Number,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,

    #[regex(r"'([^'\\\n]|\\.)*'")]
    Char,

    #[regex(r"[^ \t\r\n\f\vA-Za-z0-9_]")]
    Punct,
}

/// A lexed token with its byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

/// Lex `input` into tokens, whitespace excluded. Unlexable bytes come out as
/// `Punct` so spans stay contiguous with the source.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut lexer = TokenKind::lexer(input);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let kind = match result {
            Ok(TokenKind::Whitespace) => continue,
            Ok(kind) => kind,
            Err(()) => TokenKind::Punct,
        };
        tokens.push(Token {
            kind,
            span: lexer.span(),
        });
    }
    tokens
}

/// First token of `input` if it is a comment.
pub fn leading_comment(input: &str) -> Option<&str> {
    let mut lexer = TokenKind::lexer(input);
    loop {
        match lexer.next()? {
            Ok(TokenKind::Whitespace) => continue,
            Ok(TokenKind::Comment) => return Some(lexer.slice()),
            _ => return None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/source/lexer_tests.rs"]
mod tests;
