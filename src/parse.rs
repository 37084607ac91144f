//! Parser: concrete path in, hierarchy data out
//!
//! Each resolved template carries an anchored matcher compiled at resolution
//! time: literals match exactly, placeholders capture greedily, and the whole
//! input must be consumed. Adjacent placeholders are rejected before a
//! matcher is ever built, so there is never a split point to guess.

use tracing::{debug, trace};

use crate::error::TemplateError;
use crate::template::{HierarchyData, ResolvedTemplate, TemplateRegistry};

impl ResolvedTemplate {
    /// Match the whole of `path` against this template.
    ///
    /// Every placeholder captures at least one character, and a placeholder
    /// used more than once must capture the same text each time.
    pub fn capture(&self, path: &str) -> Option<HierarchyData> {
        let captures = self.matcher().captures(path)?;
        let mut data = HierarchyData::new();
        for (index, name) in self.placeholders().enumerate() {
            let value = captures.get(index + 1)?.as_str();
            match data.get(name) {
                Some(previous) if previous != value => return None,
                Some(_) => {}
                None => {
                    data.insert(name.to_string(), value.to_string());
                }
            }
        }
        Some(data)
    }
}

impl TemplateRegistry {
    /// Recover the data that would format to `path`, using the first
    /// candidate that matches
    #[tracing::instrument(level = "debug", skip(self, candidates), err)]
    pub fn parse<S: AsRef<str>>(
        &self,
        path: &str,
        candidates: &[S],
    ) -> Result<HierarchyData, TemplateError> {
        for candidate in candidates {
            let template = self.resolve(candidate.as_ref())?;
            match template.capture(path) {
                Some(data) => {
                    debug!(template = template.name(), "parsed path");
                    return Ok(data);
                }
                None => trace!(template = template.name(), "template does not match"),
            }
        }

        Err(TemplateError::NoParseMatch {
            path: path.to_string(),
            tried: candidates.iter().map(|c| c.as_ref().to_string()).collect(),
        })
    }
}
