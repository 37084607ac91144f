//! Lexer for the path pattern syntax using logos
//!
//! A pattern is literal text interspersed with `{name}` placeholders and an
//! optional leading `{@parent}` reference. Names are identifiers.

use logos::Logos;

pub use crate::error::Span;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    #[regex(r"\{@[a-zA-Z_][a-zA-Z0-9_]*\}", |lex| {
        let s = lex.slice();
        s[2..s.len()-1].to_string()
    })]
    ParentRef(String),

    #[regex(r"\{[a-zA-Z_][a-zA-Z0-9_]*\}", |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    Placeholder(String),

    #[regex(r"[^{}]+", |lex| lex.slice().to_string())]
    Literal(String),
}

/// Lex a pattern into tokens with spans
///
/// Unrecognised input (stray braces, bad names) comes through as `Err(())`
/// so the caller can report it against its span.
pub fn lex(input: &str) -> impl Iterator<Item = (Result<Token, ()>, Span)> + '_ {
    Token::lexer(input).spanned()
}

/// Describe an unrecognised token starting at `span.start`, widening the span
/// to cover a whole `{...}` group when there is one.
pub fn describe_error(input: &str, span: &Span) -> (Span, String) {
    let rest = &input[span.start..];
    if rest.starts_with('}') {
        return (span.start..span.start + 1, "unmatched '}'".to_string());
    }
    if !rest.starts_with('{') {
        return (span.clone(), "unexpected input".to_string());
    }
    match rest.find('}') {
        Some(close) => {
            let inner = &rest[1..close];
            let message = if inner.contains('{') {
                "nested '{' inside placeholder".to_string()
            } else if inner.is_empty() || inner == "@" {
                "empty placeholder name".to_string()
            } else {
                format!(
                    "invalid placeholder name '{}' (expected an identifier)",
                    inner.trim_start_matches('@')
                )
            };
            (span.start..span.start + close + 1, message)
        }
        None => (span.start..span.start + 1, "unclosed '{'".to_string()),
    }
}
