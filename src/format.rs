//! Formatter: hierarchy data in, path string out
//!
//! Candidates are tried in the order given and the first one whose
//! placeholders are all present in the data wins. Ordering is the only
//! tie-break, so callers list their most specific templates first.
//!
//! An empty value counts as missing: it would collapse the literals around
//! it and leave a path that no template parses back.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::TemplateError;
use crate::template::{HierarchyData, ResolvedSegment, ResolvedTemplate, TemplateRegistry};

impl ResolvedTemplate {
    /// Placeholder names this template needs that `data` does not supply,
    /// or supplies as an empty string
    pub fn missing_keys(&self, data: &HierarchyData) -> Vec<String> {
        self.keys()
            .into_iter()
            .filter(|key| data.get(*key).map_or(true, String::is_empty))
            .map(str::to_string)
            .collect()
    }

    /// Substitute `data` into the pattern.
    ///
    /// Values are emitted verbatim, separators included. Returns the missing
    /// or empty keys when the data does not cover every placeholder.
    pub fn render(&self, data: &HierarchyData) -> Result<String, Vec<String>> {
        let mut path = String::new();
        let mut missing = Vec::new();
        for segment in self.segments() {
            match segment {
                ResolvedSegment::Literal(text) => path.push_str(text),
                ResolvedSegment::Placeholder(name) => match data.get(name) {
                    Some(value) if !value.is_empty() => path.push_str(value),
                    _ if !missing.contains(name) => missing.push(name.clone()),
                    _ => {}
                },
            }
        }
        if missing.is_empty() {
            Ok(path)
        } else {
            Err(missing)
        }
    }
}

impl TemplateRegistry {
    /// Pick the first candidate whose placeholders are all present in `data`.
    ///
    /// On failure the error names the candidate with the fewest missing keys
    /// (earliest wins a tie) and lists what it was missing.
    pub fn select<S: AsRef<str>>(
        &self,
        data: &HierarchyData,
        candidates: &[S],
    ) -> Result<Arc<ResolvedTemplate>, TemplateError> {
        let mut nearest: Option<(String, Vec<String>)> = None;

        for candidate in candidates {
            let template = self.resolve(candidate.as_ref())?;
            let missing = template.missing_keys(data);
            if missing.is_empty() {
                debug!(template = template.name(), "selected template");
                return Ok(template);
            }

            trace!(template = template.name(), ?missing, "template not eligible");
            let closer = nearest
                .as_ref()
                .map_or(true, |(_, best)| missing.len() < best.len());
            if closer {
                nearest = Some((template.name().to_string(), missing));
            }
        }

        let (nearest, missing) = match nearest {
            Some((name, missing)) => (Some(name), missing),
            None => (None, Vec::new()),
        };
        Err(TemplateError::NoFormatMatch { nearest, missing })
    }

    /// Format `data` with the first eligible candidate
    #[tracing::instrument(level = "debug", skip(self, data, candidates), err)]
    pub fn format<S: AsRef<str>>(
        &self,
        data: &HierarchyData,
        candidates: &[S],
    ) -> Result<String, TemplateError> {
        let template = self.select(data, candidates)?;
        template
            .render(data)
            .map_err(|missing| TemplateError::NoFormatMatch {
                nearest: Some(template.name().to_string()),
                missing,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn data(pairs: &[(&str, &str)]) -> HierarchyData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn registry() -> TemplateRegistry {
        TemplateRegistry::from_patterns([
            ("project", "{project}"),
            ("sequence", "{@project}/05_SEQUENCE/{sequence}"),
            ("shot", "{@sequence}/{shot}"),
            ("task", "{@shot}/{task_category}/{shot_task}"),
        ])
        .expect("Should build")
    }

    #[test]
    fn test_format_shot() {
        let path = registry()
            .format(
                &data(&[("project", "DEMO"), ("sequence", "SQ01"), ("shot", "SH010")]),
                &["shot"],
            )
            .expect("Should format");
        assert_eq!(path, "DEMO/05_SEQUENCE/SQ01/SH010");
    }

    #[test]
    fn test_first_eligible_candidate_wins() {
        let registry = registry();
        let values = data(&[("project", "DEMO"), ("sequence", "SQ01"), ("shot", "SH010")]);

        let path = registry.format(&values, &["sequence", "shot"]).unwrap();
        assert_eq!(path, "DEMO/05_SEQUENCE/SQ01");

        let path = registry.format(&values, &["task", "shot", "sequence"]).unwrap();
        assert_eq!(path, "DEMO/05_SEQUENCE/SQ01/SH010");
    }

    #[test]
    fn test_missing_key_never_omitted() {
        let err = registry()
            .format(&data(&[("project", "DEMO"), ("sequence", "SQ01")]), &["shot"])
            .unwrap_err();
        assert_eq!(
            err,
            TemplateError::NoFormatMatch {
                nearest: Some("shot".to_string()),
                missing: vec!["shot".to_string()],
            }
        );
    }

    #[test]
    fn test_nearest_candidate_has_fewest_missing() {
        let err = registry()
            .format(&data(&[("project", "DEMO")]), &["task", "shot", "sequence"])
            .unwrap_err();
        assert_eq!(
            err,
            TemplateError::NoFormatMatch {
                nearest: Some("sequence".to_string()),
                missing: vec!["sequence".to_string()],
            }
        );
    }

    #[test]
    fn test_no_candidates() {
        let err = registry().format(&data(&[]), &[] as &[&str]).unwrap_err();
        assert_eq!(
            err,
            TemplateError::NoFormatMatch {
                nearest: None,
                missing: vec![],
            }
        );
    }

    #[test]
    fn test_unknown_candidate() {
        let err = registry().format(&data(&[]), &["nope"]).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound { .. }));
    }

    #[test]
    fn test_separators_in_values_pass_through() {
        let path = registry()
            .format(
                &data(&[
                    ("project", "DEMO"),
                    ("sequence", "SQ01"),
                    ("shot", "SH010"),
                    ("task_category", "2D"),
                    ("shot_task", "ELEMENTS/ROTOSCOPING"),
                ]),
                &["task"],
            )
            .unwrap();
        assert_eq!(path, "DEMO/05_SEQUENCE/SQ01/SH010/2D/ELEMENTS/ROTOSCOPING");
    }

    #[test]
    fn test_repeated_placeholder_emits_same_value() {
        let registry = TemplateRegistry::from_patterns([("twice", "{shot}/{shot}.nk")]).unwrap();
        let path = registry.format(&data(&[("shot", "SH010")]), &["twice"]).unwrap();
        assert_eq!(path, "SH010/SH010.nk");
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let registry = registry();
        let values = data(&[("project", ""), ("sequence", "SQ01")]);

        let err = registry.format(&values, &["sequence"]).unwrap_err();
        assert_eq!(
            err,
            TemplateError::NoFormatMatch {
                nearest: Some("sequence".to_string()),
                missing: vec!["project".to_string()],
            }
        );

        let sequence = registry.resolve("sequence").unwrap();
        assert_eq!(sequence.render(&values), Err(vec!["project".to_string()]));
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        let path = registry()
            .format(&data(&[("project", "DEMO"), ("asset", "chair")]), &["project"])
            .unwrap();
        assert_eq!(path, "DEMO");
    }
}
