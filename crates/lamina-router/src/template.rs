//! Compiled path templates.
//!
//! A template is split on `/` into segments. A segment written as `{name}`
//! captures exactly one non-empty path segment; every other segment must be
//! byte-identical. There are no multi-segment wildcards.

use crate::params::PathParams;
use std::fmt;
use thiserror::Error;

/// Why a template could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template does not start with `/`.
    #[error("path template '{0}' must start with '/'")]
    MissingLeadingSlash(String),

    /// A `{}` segment has no name.
    #[error("path template '{0}' has an unnamed capture")]
    EmptyCapture(String),

    /// A capture name contains characters other than ASCII letters, digits, or `_`.
    #[error("path template '{template}' has an invalid capture name '{name}'")]
    InvalidCaptureName {
        /// The offending template.
        template: String,
        /// The rejected name.
        name: String,
    },

    /// A brace appears inside a segment without wrapping all of it.
    #[error("path template '{template}' has a malformed segment '{segment}'")]
    MalformedSegment {
        /// The offending template.
        template: String,
        /// The rejected segment.
        segment: String,
    },

    /// The same capture name appears twice.
    #[error("path template '{template}' captures '{name}' more than once")]
    DuplicateCapture {
        /// The offending template.
        template: String,
        /// The repeated name.
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Capture(String),
}

/// A route path compiled into literal and capture segments.
///
/// # Example
///
/// ```rust
/// use lamina_router::PathTemplate;
///
/// let template = PathTemplate::parse("/orgs/{org_id}/users/{user_id}").unwrap();
/// assert!(!template.is_literal());
///
/// let params = template.matches("/orgs/acme/users/42").unwrap();
/// assert_eq!(params.get("org_id"), Some("acme"));
/// assert_eq!(params.get("user_id"), Some("42"));
///
/// assert!(template.matches("/orgs/acme/users").is_none());
/// assert!(template.matches("/orgs//users/42").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
    captures: Vec<String>,
}

impl PathTemplate {
    /// Compiles a template.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] for templates without a leading `/`, for
    /// unnamed, malformed, or repeated captures.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        if !template.starts_with('/') {
            return Err(TemplateError::MissingLeadingSlash(template.to_string()));
        }

        let mut segments = Vec::new();
        let mut captures: Vec<String> = Vec::new();
        for segment in template.split('/') {
            let Some(inner) = segment
                .strip_prefix('{')
                .and_then(|rest| rest.strip_suffix('}'))
            else {
                if segment.contains(['{', '}']) {
                    return Err(TemplateError::MalformedSegment {
                        template: template.to_string(),
                        segment: segment.to_string(),
                    });
                }
                segments.push(Segment::Literal(segment.to_string()));
                continue;
            };

            if inner.is_empty() {
                return Err(TemplateError::EmptyCapture(template.to_string()));
            }
            if !inner.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(TemplateError::InvalidCaptureName {
                    template: template.to_string(),
                    name: inner.to_string(),
                });
            }
            if captures.iter().any(|c| c == inner) {
                return Err(TemplateError::DuplicateCapture {
                    template: template.to_string(),
                    name: inner.to_string(),
                });
            }
            captures.push(inner.to_string());
            segments.push(Segment::Capture(inner.to_string()));
        }

        Ok(Self {
            raw: template.to_string(),
            segments,
            captures,
        })
    }

    /// Returns the template as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns `true` if the template has no captures.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.captures.is_empty()
    }

    /// Returns capture names in template order.
    #[must_use]
    pub fn capture_names(&self) -> &[String] {
        &self.captures
    }

    /// Returns the number of `/`-separated segments, counting the empty one
    /// before the leading slash.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Returns the template with capture names erased, so `/a/{x}` and
    /// `/a/{y}` share a shape.
    #[must_use]
    pub fn shape(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.as_str(),
                Segment::Capture(_) => "{}",
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Matches a request path, returning the captured values.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let mut params = PathParams::with_capacity(self.captures.len());
        let mut parts = path.split('/');

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(text) if text == part => {}
                Segment::Literal(_) => return None,
                Segment::Capture(_) if part.is_empty() => return None,
                Segment::Capture(name) => params.push(name.as_str(), part),
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(params)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_literal_template() {
        let template = PathTemplate::parse("/users").unwrap();
        assert!(template.is_literal());
        assert_eq!(template.matches("/users"), Some(PathParams::new()));
        assert!(template.matches("/users/").is_none());
        assert!(template.matches("/Users").is_none());
    }

    #[test]
    fn test_root_template() {
        let template = PathTemplate::parse("/").unwrap();
        assert!(template.matches("/").is_some());
        assert!(template.matches("/x").is_none());
    }

    #[test]
    fn test_single_capture() {
        let template = PathTemplate::parse("/users/{user_id}").unwrap();
        assert_eq!(template.capture_names(), ["user_id"]);

        let params = template.matches("/users/42").unwrap();
        assert_eq!(params.get("user_id"), Some("42"));
        assert!(template.matches("/users/").is_none());
        assert!(template.matches("/users/42/posts").is_none());
    }

    #[test]
    fn test_capture_keeps_raw_text() {
        let template = PathTemplate::parse("/files/{name}").unwrap();
        let params = template.matches("/files/a%20b.txt").unwrap();
        assert_eq!(params.get("name"), Some("a%20b.txt"));
    }

    #[test]
    fn test_shape_ignores_capture_names() {
        let a = PathTemplate::parse("/items/{id}").unwrap();
        let b = PathTemplate::parse("/items/{key}").unwrap();
        assert_eq!(a.shape(), b.shape());
        assert_ne!(a.shape(), PathTemplate::parse("/items/special").unwrap().shape());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            PathTemplate::parse("users"),
            Err(TemplateError::MissingLeadingSlash("users".into()))
        );
        assert!(matches!(
            PathTemplate::parse("/users/{}"),
            Err(TemplateError::EmptyCapture(_))
        ));
        assert!(matches!(
            PathTemplate::parse("/users/{user-id}"),
            Err(TemplateError::InvalidCaptureName { .. })
        ));
        assert!(matches!(
            PathTemplate::parse("/users/id{x}"),
            Err(TemplateError::MalformedSegment { .. })
        ));
        assert!(matches!(
            PathTemplate::parse("/a/{id}/b/{id}"),
            Err(TemplateError::DuplicateCapture { .. })
        ));
    }

    proptest! {
        #[test]
        fn test_captures_extract_segments(
            literal in "[a-z]{1,8}",
            first in "[A-Za-z0-9_.~-]{1,12}",
            second in "[A-Za-z0-9_.~-]{1,12}",
        ) {
            let template = PathTemplate::parse(&format!("/{literal}/{{a}}/{{b}}")).unwrap();
            let params = template.matches(&format!("/{literal}/{first}/{second}")).unwrap();
            prop_assert_eq!(params.len(), 2);
            prop_assert_eq!(params.get("a"), Some(first.as_str()));
            prop_assert_eq!(params.get("b"), Some(second.as_str()));
        }

        #[test]
        fn test_segment_count_mismatch_never_matches(
            template_len in 1usize..6,
            path_parts in proptest::collection::vec("[a-z0-9]{1,6}", 0..8),
        ) {
            prop_assume!(path_parts.len() != template_len);
            let template: String = (0..template_len).map(|i| format!("/{{p{i}}}")).collect();
            let template = PathTemplate::parse(&template).unwrap();
            let path: String = path_parts.iter().map(|p| format!("/{p}")).collect();
            let path = if path.is_empty() { "/".to_string() } else { path };
            prop_assert!(template.matches(&path).is_none());
        }
    }
}
