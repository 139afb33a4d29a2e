//! Registration-time declaration errors.

use thiserror::Error;

/// A parameter declaration that cannot be compiled.
///
/// These are detected when the route is registered, never per request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// Two parameters share a name.
    #[error("parameter '{0}' is declared more than once")]
    DuplicateName(String),

    /// More than one parameter reads the request body.
    #[error("parameters '{first}' and '{second}' both read the request body; at most one is allowed")]
    MultipleBodies {
        /// The first body parameter.
        first: String,
        /// The rejected body parameter.
        second: String,
    },

    /// An explicit path parameter names no capture of the template.
    #[error("path parameter '{param}' does not match any capture of '{template}'")]
    UnknownCapture {
        /// The parameter name.
        param: String,
        /// The route template.
        template: String,
    },

    /// A bound does not apply to the declared type.
    #[error("constraint '{constraint}' on parameter '{param}' does not apply to type {ty}")]
    InvalidConstraint {
        /// The parameter name.
        param: String,
        /// The constraint name.
        constraint: &'static str,
        /// The declared type.
        ty: String,
    },

    /// A pattern failed to compile.
    #[error("pattern '{pattern}' on parameter '{param}' is invalid: {reason}")]
    InvalidPattern {
        /// The parameter name.
        param: String,
        /// The pattern as declared.
        pattern: String,
        /// The regex compiler's message.
        reason: String,
    },

    /// A default does not coerce to the declared type.
    #[error("default for parameter '{param}' is invalid: {reason}")]
    InvalidDefault {
        /// The parameter name.
        param: String,
        /// Why coercion failed.
        reason: String,
    },
}
