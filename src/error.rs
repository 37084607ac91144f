//! Error types for template compilation and evaluation

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in a pattern string
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Unbalanced or invalid `{}` token, or a parent reference out of leading position
    #[error("malformed template '{name}' at {span:?}: {message}")]
    Malformed {
        name: String,
        span: Span,
        message: String,
    },

    /// A template with this name is already registered
    #[error("duplicate template definition: {name}")]
    Duplicate { name: String },

    /// A caller asked for a template that is not registered
    #[error("template not found: {name}")]
    NotFound { name: String },

    /// A parent reference points to an unregistered template
    #[error("template '{template}' references unknown parent template '{reference}'")]
    UnknownReference { template: String, reference: String },

    /// The parent chain revisits a template that is still being resolved
    #[error("circular template reference detected: {}", chain.join(" -> "))]
    CircularReference { chain: Vec<String> },

    /// Two placeholders with no literal text between them
    #[error("template '{template}' has no literal between {{{first}}} and {{{second}}}")]
    AmbiguousPlaceholders {
        template: String,
        first: String,
        second: String,
    },

    /// No candidate template has all of its placeholders satisfied by the data
    #[error("no template can format the data{}", describe_nearest(.nearest, .missing))]
    NoFormatMatch {
        nearest: Option<String>,
        missing: Vec<String>,
    },

    /// No candidate template matches the whole path
    #[error("no template matches path '{path}' (tried: {})", .tried.join(", "))]
    NoParseMatch { path: String, tried: Vec<String> },
}

fn describe_nearest(nearest: &Option<String>, missing: &[String]) -> String {
    match nearest {
        Some(name) => format!(
            " (nearest candidate '{}' is missing: {})",
            name,
            missing.join(", ")
        ),
        None => " (no candidates given)".to_string(),
    }
}

impl TemplateError {
    /// True for both the format and the parse flavour of "no matching template"
    pub fn is_no_match(&self) -> bool {
        matches!(
            self,
            TemplateError::NoFormatMatch { .. } | TemplateError::NoParseMatch { .. }
        )
    }

    /// Render the error against the pattern it came from.
    ///
    /// Malformed patterns get a source-annotated report pointing at the
    /// offending token; every other error renders as its plain message.
    pub fn report(&self, pattern: &str) -> String {
        let TemplateError::Malformed {
            name,
            span,
            message,
        } = self
        else {
            return self.to_string();
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, name.as_str(), span.start)
            .with_config(Config::default().with_color(false))
            .with_message(format!("malformed template '{}'", name))
            .with_label(
                Label::new((name.as_str(), span.clone()))
                    .with_message(message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((name.as_str(), Source::from(pattern)), &mut buf);

        match written {
            Ok(()) => String::from_utf8(buf).unwrap_or_else(|_| self.to_string()),
            Err(_) => self.to_string(),
        }
    }
}
