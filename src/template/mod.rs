//! Path templates
//!
//! A template is a named path pattern made of literal text and `{name}`
//! placeholders, optionally built on another template through a leading
//! `{@parent}` reference. Templates live in a [`TemplateRegistry`], which
//! expands parent chains once and hands out the expanded
//! [`ResolvedTemplate`]s used for formatting and parsing.
//!
//! # Example
//!
//! ```text
//! sequence = "{project}/05_SEQUENCE/{sequence}"
//! shot     = "{@sequence}/{shot}"
//!
//! // shot resolves to {project}/05_SEQUENCE/{sequence}/{shot}
//! ```

use std::collections::BTreeMap;

pub mod lexer;
mod registry;
mod resolver;
mod segment;

pub use registry::{ResolvedSegment, ResolvedTemplate, TemplateRegistry};
pub use resolver::ResolutionContext;
pub use segment::{Segment, Template};

/// Placeholder name -> value, supplied per format call or produced by parse
pub type HierarchyData = BTreeMap<String, String>;
