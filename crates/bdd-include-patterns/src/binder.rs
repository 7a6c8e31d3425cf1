//! Placeholder bindings supplied by an include directive.
//!
//! A directive's `params: [time1:9, time2:8]` clause becomes an ordered
//! [`Bindings`] list. [`substitute`] replaces `<time1>`-style tokens in a
//! line with the bound values and [`count_matches`] guards Examples rows
//! against a parameter set of the wrong arity.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Regex pattern matching `<placeholder>` tokens in step text.
///
/// Captures the placeholder name without the angle brackets, including spaces
/// and punctuation commonly used in Gherkin Examples headers.
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([^>\s][^>]*)>").unwrap_or_else(|_| unreachable!("placeholder regex is valid"))
});

/// One `key:value` pair from a directive's `params` clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binding {
    key: String,
    value: String,
}

impl Binding {
    /// Create a binding. The key may be written bare (`time1`) or in
    /// placeholder form (`<time1>`); both bind the placeholder `<time1>`.
    ///
    /// # Examples
    /// ```
    /// use bdd_include_patterns::Binding;
    /// let bare = Binding::new("time1", "9");
    /// let wrapped = Binding::new("<time1>", "9");
    /// assert_eq!(bare, wrapped);
    /// assert_eq!(bare.key(), "time1");
    /// ```
    #[must_use]
    pub fn new(key: impl AsRef<str>, value: impl Into<String>) -> Self {
        let key = key.as_ref().trim();
        let key = key
            .strip_prefix('<')
            .and_then(|inner| inner.strip_suffix('>'))
            .unwrap_or(key);
        Self {
            key: key.to_owned(),
            value: value.into(),
        }
    }

    /// The placeholder name, without angle brackets.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The replacement text.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Ordered bindings; the first declared binding for a key wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bindings(Vec<Binding>);

impl Bindings {
    /// An empty binding list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair a flat `[key, value, key, value, ...]` list.
    ///
    /// A trailing unpaired element is dropped, so seven elements yield three
    /// bindings.
    ///
    /// # Examples
    /// ```
    /// use bdd_include_patterns::Bindings;
    /// let bindings = Bindings::from_flat(["<time1>", "9", "<time2>", "8", "stray"]);
    /// assert_eq!(bindings.len(), 2);
    /// assert_eq!(bindings.flattened_len(), 4);
    /// ```
    #[must_use]
    pub fn from_flat<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut bindings = Vec::new();
        let mut pending: Option<S> = None;
        for item in items {
            match pending.take() {
                Some(key) => bindings.push(Binding::new(key, item.as_ref())),
                None => pending = Some(item),
            }
        }
        Self(bindings)
    }

    /// Append a binding, keeping declaration order.
    pub fn push(&mut self, binding: Binding) {
        self.0.push(binding);
    }

    /// Number of key/value pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Number of elements when flattened to `[key, value, ...]`.
    #[must_use]
    pub fn flattened_len(&self) -> usize {
        self.0.len().saturating_mul(2)
    }

    /// Returns `true` when no bindings were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate bindings in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Binding> {
        self.0.iter()
    }

    /// Look up the value bound to `key`, ignoring later duplicates.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|binding| binding.key == key)
            .map(Binding::value)
    }
}

impl FromIterator<Binding> for Bindings {
    fn from_iter<T: IntoIterator<Item = Binding>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Bindings {
    type Item = &'a Binding;
    type IntoIter = std::slice::Iter<'a, Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Replace every bound `<key>` token in `line` with its value.
///
/// Only placeholders present in the original line are replaced; a value that
/// itself contains `<other>` is inserted literally and never re-substituted.
/// Placeholders without a binding are left untouched.
///
/// # Examples
/// ```
/// use bdd_include_patterns::{Bindings, substitute};
/// let bindings = Bindings::from_flat(["<time1>", "9", "<time2>", "8"]);
/// assert_eq!(
///     substitute("Given that <time1> is not equal to <time2> into a step", &bindings),
///     "Given that 9 is not equal to 8 into a step"
/// );
/// ```
#[must_use]
pub fn substitute(line: &str, bindings: &Bindings) -> String {
    if bindings.is_empty() {
        return line.to_owned();
    }
    PLACEHOLDER_RE
        .replace_all(line, |caps: &Captures<'_>| {
            let name = caps.get(1).map_or("", |m| m.as_str());
            match bindings.get(name) {
                Some(value) => value.to_owned(),
                None => caps.get(0).map_or_else(String::new, |m| m.as_str().to_owned()),
            }
        })
        .into_owned()
}

/// Count the cells of a pipe-delimited table row.
///
/// Escaped pipes (`\|`) belong to a cell and do not separate cells. Text
/// without any pipe has no cells.
///
/// # Examples
/// ```
/// use bdd_include_patterns::row_cell_count;
/// assert_eq!(row_cell_count("| hey | ho |"), 2);
/// assert_eq!(row_cell_count(r"| a \| b |"), 1);
/// assert_eq!(row_cell_count("Given a step"), 0);
/// ```
#[must_use]
pub fn row_cell_count(row: &str) -> usize {
    let trimmed = row.trim();
    let mut pipes = 0usize;
    let mut escaped = false;
    let mut after_last_pipe = false;
    for ch in trimmed.chars() {
        if escaped {
            escaped = false;
            after_last_pipe = true;
            continue;
        }
        match ch {
            '\\' => {
                escaped = true;
                after_last_pipe = true;
            }
            '|' => {
                pipes = pipes.saturating_add(1);
                after_last_pipe = false;
            }
            _ => after_last_pipe = true,
        }
    }
    if pipes == 0 {
        return 0;
    }
    let cells = pipes.saturating_sub(1);
    if after_last_pipe {
        cells.saturating_add(1)
    } else {
        cells
    }
}

/// Returns `true` when the Examples row has exactly one cell per binding.
///
/// # Examples
/// ```
/// use bdd_include_patterns::{Bindings, count_matches};
/// let pairs = Bindings::from_flat(["<time1>", "9", "<time2>", "8"]);
/// let too_many = Bindings::from_flat(["<time1>", "9", "<time2>", "23", "33", "32", "10"]);
/// assert!(count_matches("| hey | ho |", &pairs));
/// assert!(!count_matches("| hey | ho |", &too_many));
/// ```
#[must_use]
pub fn count_matches(row: &str, bindings: &Bindings) -> bool {
    row_cell_count(row) == bindings.len()
}
