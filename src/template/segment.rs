//! Pattern segments and the `Template` they make up

use std::fmt;

use tracing::trace;

use crate::error::TemplateError;

use super::lexer::{describe_error, lex, Token};

/// One token of an authored pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Text copied verbatim
    Literal(String),
    /// A named substitution point
    Placeholder(String),
    /// Splices another template's resolved pattern in as a prefix
    ParentRef(String),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(text) => f.write_str(text),
            Segment::Placeholder(name) => write!(f, "{{{}}}", name),
            Segment::ParentRef(name) => write!(f, "{{@{}}}", name),
        }
    }
}

/// A named, unresolved path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    pattern: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Compile a pattern string into segments.
    ///
    /// Fails with [`TemplateError::Malformed`] on bad braces, a non-identifier
    /// name, or a parent reference anywhere but the start, and with
    /// [`TemplateError::AmbiguousPlaceholders`] when two placeholders touch.
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Result<Self, TemplateError> {
        let name = name.into();
        let pattern = pattern.into();

        if !is_identifier(&name) {
            return Err(TemplateError::Malformed {
                span: 0..0,
                message: format!("template name '{}' is not an identifier", name),
                name,
            });
        }
        if pattern.is_empty() {
            return Err(TemplateError::Malformed {
                name,
                span: 0..0,
                message: "empty pattern".to_string(),
            });
        }

        let mut segments = Vec::new();
        for (index, (token, span)) in lex(&pattern).enumerate() {
            let segment = match token {
                Ok(Token::Literal(text)) => Segment::Literal(text),
                Ok(Token::Placeholder(placeholder)) => Segment::Placeholder(placeholder),
                Ok(Token::ParentRef(parent)) if index == 0 => Segment::ParentRef(parent),
                Ok(Token::ParentRef(parent)) => {
                    return Err(TemplateError::Malformed {
                        name,
                        span,
                        message: format!(
                            "parent reference '{{@{}}}' must be the leading token",
                            parent
                        ),
                    });
                }
                Err(()) => {
                    let (span, message) = describe_error(&pattern, &span);
                    return Err(TemplateError::Malformed {
                        name,
                        span,
                        message,
                    });
                }
            };

            if let (Some(Segment::Placeholder(first)), Segment::Placeholder(second)) =
                (segments.last(), &segment)
            {
                return Err(TemplateError::AmbiguousPlaceholders {
                    template: name.clone(),
                    first: first.clone(),
                    second: second.clone(),
                });
            }
            segments.push(segment);
        }

        trace!(template = %name, segments = segments.len(), "compiled pattern");
        Ok(Self {
            name,
            pattern,
            segments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pattern as authored
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Name of the parent template, if the pattern starts with `{@parent}`
    pub fn parent(&self) -> Option<&str> {
        match self.segments.first() {
            Some(Segment::ParentRef(parent)) => Some(parent),
            _ => None,
        }
    }

    /// Segments after the parent reference
    pub fn own_segments(&self) -> &[Segment] {
        if self.parent().is_some() {
            &self.segments[1..]
        } else {
            &self.segments
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
