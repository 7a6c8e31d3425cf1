//! Recursive-descent parser for the `@include(...)` tag.
//!
//! The grammar is
//!
//! ```text
//! @include(feature: <id>, scenario: <name>[, params: [<k>:<v>{, <k>:<v>}*]])
//! ```
//!
//! Whitespace around separators is insignificant. Top-level commas separate
//! fields; commas inside the bracketed `params` list separate bindings.

use crate::binder::{Binding, Bindings};
use crate::errors::DirectiveError;

const INCLUDE_TAG: &str = "@include";

/// A parsed `@include` tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncludeDirective {
    /// Identifier of the feature holding the scenario, usually a file name.
    pub feature: String,
    /// Name of the scenario to copy.
    pub scenario: String,
    /// Parameter bindings in declaration order.
    pub bindings: Bindings,
}

/// Returns `true` when `tag` names the include directive, with or without
/// an argument list.
///
/// # Examples
/// ```
/// use bdd_include_patterns::is_include_tag;
/// assert!(is_include_tag("@include(feature: a.feature, scenario: B)"));
/// assert!(!is_include_tag("@included"));
/// ```
#[must_use]
pub fn is_include_tag(tag: &str) -> bool {
    crate::tags::tag_name(tag) == "include" && tag.trim_start().starts_with(INCLUDE_TAG)
}

/// Parse one `@include(...)` tag.
///
/// # Errors
/// Returns [`DirectiveError`] when the tag is not an include directive, when
/// the `feature:` or `scenario:` field is absent or empty, or when a field or
/// binding is malformed. A missing `params` clause is not an error.
///
/// # Examples
/// ```
/// use bdd_include_patterns::parse_include_directive;
/// let directive = parse_include_directive(
///     "@include(feature: test.feature,scenario: To copy,params: [time1:9, time2:9])",
/// )
/// .unwrap();
/// assert_eq!(directive.feature, "test.feature");
/// assert_eq!(directive.scenario, "To copy");
/// assert_eq!(directive.bindings.flattened_len(), 4);
/// ```
pub fn parse_include_directive(tag: &str) -> Result<IncludeDirective, DirectiveError> {
    let body = argument_list(tag)?;

    let mut feature = None;
    let mut scenario = None;
    let mut bindings = None;
    for raw in split_top_level(body, ',') {
        let field = raw.trim();
        if field.is_empty() {
            continue;
        }
        let (name, value) = field
            .split_once(':')
            .ok_or_else(|| DirectiveError::MalformedField(field.to_owned()))?;
        let name = name.trim();
        let value = value.trim();
        match name {
            "feature" => set_once(&mut feature, name, required(value, "feature")?)?,
            "scenario" => set_once(&mut scenario, name, required(value, "scenario")?)?,
            "params" => set_once(&mut bindings, name, parse_params(value)?)?,
            other => return Err(DirectiveError::UnknownField(other.to_owned())),
        }
    }

    Ok(IncludeDirective {
        feature: feature.ok_or(DirectiveError::MissingField("feature"))?,
        scenario: scenario.ok_or(DirectiveError::MissingField("scenario"))?,
        bindings: bindings.unwrap_or_default(),
    })
}

fn argument_list(tag: &str) -> Result<&str, DirectiveError> {
    let trimmed = tag.trim();
    let not_include = || DirectiveError::NotAnInclude(trimmed.to_owned());
    let rest = trimmed.strip_prefix(INCLUDE_TAG).ok_or_else(not_include)?;
    if rest.trim().is_empty() {
        return Err(DirectiveError::MissingField("feature"));
    }
    let open = rest.trim_start().strip_prefix('(').ok_or_else(not_include)?;
    open.strip_suffix(')').ok_or(DirectiveError::Unterminated)
}

fn required(value: &str, field: &'static str) -> Result<String, DirectiveError> {
    if value.is_empty() {
        return Err(DirectiveError::MissingField(field));
    }
    Ok(value.to_owned())
}

fn set_once<T>(slot: &mut Option<T>, name: &str, value: T) -> Result<(), DirectiveError> {
    if slot.is_some() {
        return Err(DirectiveError::DuplicateField(name.to_owned()));
    }
    *slot = Some(value);
    Ok(())
}

fn parse_params(value: &str) -> Result<Bindings, DirectiveError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| DirectiveError::MalformedParams(value.to_owned()))?;

    let mut bindings = Bindings::new();
    for raw in split_top_level(inner, ',') {
        let entry = raw.trim();
        if entry.is_empty() {
            continue;
        }
        let (key, bound) = entry
            .split_once(':')
            .ok_or_else(|| DirectiveError::MalformedBinding(entry.to_owned()))?;
        let binding = Binding::new(key, bound.trim());
        if binding.key().is_empty() {
            return Err(DirectiveError::MalformedBinding(entry.to_owned()));
        }
        bindings.push(binding);
    }
    Ok(bindings)
}

/// Split `text` on `separator`, ignoring separators nested in `()` or `[]`.
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (idx, ch) in text.char_indices() {
        match ch {
            '(' | '[' => depth = depth.saturating_add(1),
            ')' | ']' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                if let Some(part) = text.get(start..idx) {
                    parts.push(part);
                }
                start = idx.saturating_add(c.len_utf8());
            }
            _ => {}
        }
    }
    if let Some(part) = text.get(start..) {
        parts.push(part);
    }
    parts
}
