//! Constraint checking.
//!
//! Bounds are checked after coercion in a fixed order: `gt`, `ge`, `lt`,
//! `le`, `min_length`, `max_length`, `pattern`. The first violation wins.

use crate::error::DescriptorError;
use crate::param::{Bounds, ParamType};
use crate::value::ArgValue;
use lamina_core::{Constraint, ParamSource, ValidationFailure};
use regex::Regex;

/// A compiled pattern, anchored at the start of the value.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles `source` so that it must match from the first character.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{source})"))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// Returns the pattern as declared.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns `true` if `text` matches from its first character.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// The bounds declared on one parameter, checked against its type.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    gt: Option<f64>,
    ge: Option<f64>,
    lt: Option<f64>,
    le: Option<f64>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<Pattern>,
}

impl Constraints {
    /// Compiles declared bounds, rejecting bounds that cannot apply to `ty`.
    pub(crate) fn compile(param: &str, ty: &ParamType, bounds: &Bounds) -> Result<Self, DescriptorError> {
        let reject = |constraint: &'static str| DescriptorError::InvalidConstraint {
            param: param.to_string(),
            constraint,
            ty: ty.to_string(),
        };

        let numeric = [
            ("gt", bounds.gt),
            ("ge", bounds.ge),
            ("lt", bounds.lt),
            ("le", bounds.le),
        ];
        for (name, bound) in numeric {
            match bound {
                Some(_) if !ty.is_numeric() => return Err(reject(name)),
                Some(n) if !n.is_finite() => return Err(reject(name)),
                _ => {}
            }
        }
        if bounds.min_length.is_some() && !ty.has_length() {
            return Err(reject("min_length"));
        }
        if bounds.max_length.is_some() && !ty.has_length() {
            return Err(reject("max_length"));
        }

        let pattern = match &bounds.pattern {
            Some(_) if *ty != ParamType::String => return Err(reject("pattern")),
            Some(source) => Some(Pattern::new(source).map_err(|e| DescriptorError::InvalidPattern {
                param: param.to_string(),
                pattern: source.clone(),
                reason: e.to_string(),
            })?),
            None => None,
        };

        Ok(Self {
            gt: bounds.gt,
            ge: bounds.ge,
            lt: bounds.lt,
            le: bounds.le,
            min_length: bounds.min_length,
            max_length: bounds.max_length,
            pattern,
        })
    }

    /// Returns `true` if no bound is declared.
    pub fn is_empty(&self) -> bool {
        self.gt.is_none()
            && self.ge.is_none()
            && self.lt.is_none()
            && self.le.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.is_none()
    }

    /// Checks a coerced value. `null` satisfies every bound.
    pub fn check(&self, value: &ArgValue, name: &str, source: ParamSource) -> Result<(), ValidationFailure> {
        let fail = |constraint: Constraint| -> Result<(), ValidationFailure> {
            Err(ValidationFailure::violated(
                name,
                source,
                Some(value.to_json()),
                constraint,
            ))
        };

        if let Some(n) = value.number() {
            if let Some(bound) = self.gt.filter(|bound| n <= *bound) {
                return fail(Constraint::Gt(bound));
            }
            if let Some(bound) = self.ge.filter(|bound| n < *bound) {
                return fail(Constraint::Ge(bound));
            }
            if let Some(bound) = self.lt.filter(|bound| n >= *bound) {
                return fail(Constraint::Lt(bound));
            }
            if let Some(bound) = self.le.filter(|bound| n > *bound) {
                return fail(Constraint::Le(bound));
            }
        }

        if let Some(len) = value.length() {
            if let Some(min) = self.min_length.filter(|min| len < *min) {
                return fail(Constraint::MinLength(min));
            }
            if let Some(max) = self.max_length.filter(|max| len > *max) {
                return fail(Constraint::MaxLength(max));
            }
        }

        if let (Some(pattern), ArgValue::String(text)) = (&self.pattern, value) {
            if !pattern.is_match(text) {
                return fail(Constraint::Pattern(pattern.as_str().to_string()));
            }
        }

        Ok(())
    }
}
