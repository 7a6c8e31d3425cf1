//! Error types shared by the directive parsing modules.

use thiserror::Error;

/// Errors surfaced while parsing an `@include(...)` tag.
///
/// # Examples
/// ```
/// use bdd_include_patterns::{DirectiveError, parse_include_directive};
/// let err = parse_include_directive("@include(scenario: To copy)").unwrap_err();
/// assert_eq!(err, DirectiveError::MissingField("feature"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    /// The tag is not an `@include` tag at all.
    #[error("`{0}` is not an @include directive")]
    NotAnInclude(String),
    /// The argument list is not closed by a final `)`.
    #[error("missing closing ')' for @include directive")]
    Unterminated,
    /// A required field is absent or empty.
    #[error("@include directive is missing the required `{0}:` field")]
    MissingField(&'static str),
    /// A field name outside `feature`, `scenario` and `params`.
    #[error("unknown @include field `{0}`")]
    UnknownField(String),
    /// The same field was supplied twice.
    #[error("duplicate @include field `{0}`")]
    DuplicateField(String),
    /// A top-level argument is not of the form `name: value`.
    #[error("expected `name: value` in @include directive but found `{0}`")]
    MalformedField(String),
    /// The `params` value is not a bracketed list.
    #[error("`params` must be a bracketed list such as `[key:value]`, found `{0}`")]
    MalformedParams(String),
    /// A `params` entry is not of the form `key:value`.
    #[error("expected `key:value` in @include params but found `{0}`")]
    MalformedBinding(String),
}
