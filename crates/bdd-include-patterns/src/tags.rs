//! Splits Gherkin tag lines into individual tags.
//!
//! Tags are separated by whitespace, but an argument list such as
//! `@include(feature: a.feature, scenario: Log in)` contains spaces of its
//! own. The splitter tracks parenthesis and bracket depth so whitespace inside
//! an argument list never ends a tag.

/// Returns `true` when the first non-blank character of `line` is `@`.
///
/// # Examples
/// ```
/// use bdd_include_patterns::is_tag_line;
/// assert!(is_tag_line("  @smoke @fast"));
/// assert!(!is_tag_line("    Given a step mentioning @include"));
/// ```
#[must_use]
pub fn is_tag_line(line: &str) -> bool {
    line.trim_start().starts_with('@')
}

/// Split a tag line into its tags, keeping argument lists intact.
///
/// Text that does not start with `@` is ignored, so trailing comments do not
/// turn into tags.
///
/// # Examples
/// ```
/// use bdd_include_patterns::split_tags;
/// let tags = split_tags("@smoke @include(feature: a.feature, scenario: Log in)");
/// assert_eq!(
///     tags,
///     vec!["@smoke", "@include(feature: a.feature, scenario: Log in)"]
/// );
/// ```
#[must_use]
pub fn split_tags(line: &str) -> Vec<&str> {
    let mut tags = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;

    for (idx, ch) in line.char_indices() {
        match ch {
            '(' | '[' if start.is_some() => depth = depth.saturating_add(1),
            ')' | ']' if start.is_some() => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(begin) = start.take() {
                    push_tag(line, begin, idx, &mut tags);
                }
            }
            '#' if start.is_none() => break,
            _ if start.is_none() => start = Some(idx),
            _ => {}
        }
    }
    if let Some(begin) = start {
        push_tag(line, begin, line.len(), &mut tags);
    }
    tags
}

fn push_tag<'a>(line: &'a str, start: usize, end: usize, tags: &mut Vec<&'a str>) {
    if let Some(tag) = line.get(start..end) {
        if tag.starts_with('@') {
            tags.push(tag);
        }
    }
}

/// Returns the name of a tag: the text after `@` up to any argument list.
///
/// # Examples
/// ```
/// use bdd_include_patterns::tag_name;
/// assert_eq!(tag_name("@tillfixed(QA-12)"), "tillfixed");
/// assert_eq!(tag_name("@ignore"), "ignore");
/// ```
#[must_use]
pub fn tag_name(tag: &str) -> &str {
    let bare = tag.trim().trim_start_matches('@');
    bare.split_once('(').map_or(bare, |(name, _)| name).trim_end()
}
