//! Template registry: stores templates and expands their parent chains

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::debug;

use crate::error::TemplateError;

use super::resolver::ResolutionContext;
use super::segment::{Segment, Template};

/// A segment of a fully expanded pattern. Parent references never survive
/// resolution, so they have no variant here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolvedSegment {
    Literal(String),
    Placeholder(String),
}

impl fmt::Display for ResolvedSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedSegment::Literal(text) => f.write_str(text),
            ResolvedSegment::Placeholder(name) => write!(f, "{{{}}}", name),
        }
    }
}

/// A template with every parent reference expanded, ready to format and parse
#[derive(Debug, Clone)]
pub struct ResolvedTemplate {
    name: String,
    segments: Vec<ResolvedSegment>,
    matcher: Regex,
}

impl ResolvedTemplate {
    fn new(name: &str, segments: Vec<ResolvedSegment>) -> Result<Self, TemplateError> {
        for pair in segments.windows(2) {
            if let [ResolvedSegment::Placeholder(first), ResolvedSegment::Placeholder(second)] =
                pair
            {
                return Err(TemplateError::AmbiguousPlaceholders {
                    template: name.to_string(),
                    first: first.clone(),
                    second: second.clone(),
                });
            }
        }

        let mut source = String::from("(?s)^");
        for segment in &segments {
            match segment {
                ResolvedSegment::Literal(text) => source.push_str(&regex::escape(text)),
                ResolvedSegment::Placeholder(_) => source.push_str("(.+)"),
            }
        }
        source.push('$');

        let matcher = Regex::new(&source).map_err(|e| TemplateError::Malformed {
            name: name.to_string(),
            span: 0..0,
            message: format!("pattern does not compile to a matcher: {}", e),
        })?;

        Ok(Self {
            name: name.to_string(),
            segments,
            matcher,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn segments(&self) -> &[ResolvedSegment] {
        &self.segments
    }

    /// The expanded pattern, e.g. `{project}/05_SEQUENCE/{sequence}/{shot}`
    pub fn pattern(&self) -> String {
        self.segments.iter().map(|s| s.to_string()).collect()
    }

    /// Placeholder names in pattern order, repeats included
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            ResolvedSegment::Placeholder(name) => Some(name.as_str()),
            ResolvedSegment::Literal(_) => None,
        })
    }

    /// Distinct placeholder names in order of first appearance
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for name in self.placeholders() {
            if !keys.contains(&name) {
                keys.push(name);
            }
        }
        keys
    }

    pub(crate) fn matcher(&self) -> &Regex {
        &self.matcher
    }
}

#[derive(Debug)]
struct Entry {
    template: Template,
    resolved: OnceLock<Arc<ResolvedTemplate>>,
}

/// Registry of named templates.
///
/// Templates are registered up front; resolution results are cached per name
/// so the registry can be shared read-only across threads once built.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl TemplateRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `(name, pattern)` pairs and resolve everything,
    /// so a bad pattern or reference fails here rather than on first use.
    pub fn from_patterns<I, N, P>(patterns: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: Into<String>,
    {
        let mut registry = Self::new();
        for (name, pattern) in patterns {
            registry.register(Template::new(name, pattern)?)?;
        }
        registry.resolve_all()?;
        Ok(registry)
    }

    /// Register a template
    pub fn register(&mut self, template: Template) -> Result<(), TemplateError> {
        if self.index.contains_key(template.name()) {
            return Err(TemplateError::Duplicate {
                name: template.name().to_string(),
            });
        }

        debug!(template = template.name(), pattern = template.pattern(), "registered template");
        self.index
            .insert(template.name().to_string(), self.entries.len());
        self.entries.push(Entry {
            template,
            resolved: OnceLock::new(),
        });
        Ok(())
    }

    /// Get a template by name
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.entry(name).map(|e| &e.template)
    }

    /// Check if a template exists
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Template names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.template.name())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expand a template's parent chain.
    ///
    /// Results are memoized; failures are not, and resolving the same name
    /// always gives the same answer.
    pub fn resolve(&self, name: &str) -> Result<Arc<ResolvedTemplate>, TemplateError> {
        let mut ctx = ResolutionContext::new();
        self.resolve_in(name, &mut ctx)
    }

    /// Resolve every registered template once
    pub fn resolve_all(&self) -> Result<(), TemplateError> {
        for entry in &self.entries {
            self.resolve(entry.template.name())?;
        }
        debug!(templates = self.entries.len(), "resolved all templates");
        Ok(())
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    fn resolve_in(
        &self,
        name: &str,
        ctx: &mut ResolutionContext,
    ) -> Result<Arc<ResolvedTemplate>, TemplateError> {
        let entry = self.entry(name).ok_or_else(|| TemplateError::NotFound {
            name: name.to_string(),
        })?;

        if let Some(done) = entry.resolved.get() {
            return Ok(Arc::clone(done));
        }

        // Check for circular references
        if ctx.is_resolving(name) {
            return Err(TemplateError::CircularReference {
                chain: ctx.cycle_to(name),
            });
        }

        ctx.start_resolving(name);
        let result = self.expand(&entry.template, ctx);
        ctx.done_resolving(name);

        let resolved = Arc::new(result?);
        debug!(template = name, pattern = %resolved.pattern(), "resolved template");
        Ok(Arc::clone(entry.resolved.get_or_init(|| resolved)))
    }

    fn expand(
        &self,
        template: &Template,
        ctx: &mut ResolutionContext,
    ) -> Result<ResolvedTemplate, TemplateError> {
        let mut segments = Vec::new();

        if let Some(parent) = template.parent() {
            if !self.contains(parent) {
                return Err(TemplateError::UnknownReference {
                    template: template.name().to_string(),
                    reference: parent.to_string(),
                });
            }
            let parent = self.resolve_in(parent, ctx)?;
            segments.extend(parent.segments().iter().cloned());
        }

        for segment in template.own_segments() {
            match segment {
                Segment::Literal(text) => match segments.last_mut() {
                    Some(ResolvedSegment::Literal(prev)) => prev.push_str(text),
                    _ => segments.push(ResolvedSegment::Literal(text.clone())),
                },
                Segment::Placeholder(name) => {
                    segments.push(ResolvedSegment::Placeholder(name.clone()))
                }
                Segment::ParentRef(_) => {
                    unreachable!("Template::new only accepts a leading parent reference")
                }
            }
        }

        ResolvedTemplate::new(template.name(), segments)
    }
}
