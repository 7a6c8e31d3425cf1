//! Line-oriented views of feature files.

use camino::Utf8PathBuf;

/// An ordered sequence of feature-file lines.
///
/// Expansion never edits a document in place; it builds a new one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureDocument {
    lines: Vec<String>,
}

impl FeatureDocument {
    /// Wrap pre-split lines.
    #[must_use]
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Split feature text into lines, accepting both `\n` and `\r\n`.
    ///
    /// # Examples
    /// ```
    /// use bdd_include::FeatureDocument;
    /// let doc = FeatureDocument::from_text("Feature: a\r\n  Scenario: b\n");
    /// assert_eq!(doc.lines(), ["Feature: a", "  Scenario: b"]);
    /// ```
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_owned).collect(),
        }
    }

    /// The document's lines.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Consume the document, returning its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` for a document without lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Join the lines with `\n`, ending with a trailing newline.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

impl From<Vec<String>> for FeatureDocument {
    fn from(lines: Vec<String>) -> Self {
        Self::new(lines)
    }
}

impl From<&str> for FeatureDocument {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

/// The lines of one scenario copied out of a feature document.
///
/// `lines` runs from the `Scenario:`/`Scenario Outline:` header up to the next
/// scenario or rule, including any Examples tables. Tag lines and blank lines
/// that precede the next header belong to that header, not to this block.
/// The scenario's own tag lines are kept apart in `tag_lines`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioBlock {
    /// Feature id as written in the directive.
    pub feature_id: String,
    /// Path the provider resolved the feature id to.
    pub source: Utf8PathBuf,
    /// Scenario name as matched against the header.
    pub scenario_name: String,
    /// 1-based line number of the header within `source`.
    pub start_line: usize,
    /// Tag lines directly above the header.
    pub tag_lines: Vec<String>,
    /// Header and body lines.
    pub lines: Vec<String>,
}

impl ScenarioBlock {
    /// 1-based line number of the first entry of `tag_lines`.
    #[must_use]
    pub fn tag_lines_start(&self) -> usize {
        self.start_line.saturating_sub(self.tag_lines.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_text_with_trailing_newline() {
        let doc = FeatureDocument::from_text("Feature: a\n  Scenario: b\n");
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.to_text(), "Feature: a\n  Scenario: b\n");
    }

    #[test]
    fn empty_text_yields_empty_document() {
        let doc = FeatureDocument::from("");
        assert!(doc.is_empty());
    }
}
