//! Splices included scenarios into feature documents.
//!
//! The expander walks a document line by line. A tag line carrying an
//! `@include(...)` directive is replaced by the referenced scenario, with the
//! directive's bindings applied, and the spliced lines are expanded in turn
//! so nested includes resolve before the pass completes. Any failure aborts
//! the whole document.

use std::fmt;

use bdd_include_patterns::{
    Bindings, count_matches, is_include_tag, is_tag_line, parse_include_directive,
    row_cell_count, split_tags, substitute,
};
use camino::{Utf8Path, Utf8PathBuf};

use crate::config::ExpansionConfig;
use crate::document::{FeatureDocument, ScenarioBlock};
use crate::error::IncludeError;
use crate::provider::FeatureProvider;
use crate::resolver::ScenarioResolver;

const EXAMPLES_KEYWORDS: [&str; 2] = ["Examples:", "Scenarios:"];

/// One scenario on the current inclusion stack.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Inclusion {
    source: Utf8PathBuf,
    scenario: String,
}

impl fmt::Display for Inclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.scenario)
    }
}

/// A tag line split into its include directives and the remaining tags.
struct DirectiveLine<'a> {
    indent: &'a str,
    directives: Vec<&'a str>,
    siblings: Vec<&'a str>,
}

impl<'a> DirectiveLine<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        if !is_tag_line(line) {
            return None;
        }
        let (directives, siblings): (Vec<&str>, Vec<&str>) =
            split_tags(line).into_iter().partition(|tag| is_include_tag(tag));
        if directives.is_empty() {
            return None;
        }
        let indent_len = line.len().saturating_sub(line.trim_start().len());
        Some(Self {
            indent: line.get(..indent_len).unwrap_or_default(),
            directives,
            siblings,
        })
    }
}

/// Expands `@include` directives using documents from a [`FeatureProvider`].
///
/// # Examples
/// ```
/// use bdd_include::{FeatureDocument, InclusionExpander, MemoryFeatureProvider};
/// use camino::Utf8Path;
///
/// let mut provider = MemoryFeatureProvider::new();
/// provider.insert(
///     "features/shared.feature",
///     "Feature: shared\n  Scenario: Log in\n    Given I log in as <user>\n",
/// );
/// let consumer = FeatureDocument::from_text(concat!(
///     "Feature: checkout\n",
///     "  @include(feature: shared.feature, scenario: Log in, params: [user:bob])\n",
///     "  Scenario: Pay\n",
///     "    When I pay\n",
/// ));
///
/// let expanded = InclusionExpander::new(provider)
///     .expand(&consumer, Utf8Path::new("features/checkout.feature"))
///     .unwrap();
/// assert_eq!(
///     expanded.lines(),
///     [
///         "Feature: checkout",
///         "  Scenario: Log in",
///         "    Given I log in as bob",
///         "  Scenario: Pay",
///         "    When I pay",
///     ]
/// );
/// ```
#[derive(Clone, Debug)]
pub struct InclusionExpander<P> {
    provider: P,
    config: ExpansionConfig,
}

impl<P: FeatureProvider> InclusionExpander<P> {
    /// Create an expander with the default configuration.
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, ExpansionConfig::default())
    }

    /// Create an expander with an explicit configuration.
    #[must_use]
    pub fn with_config(provider: P, config: ExpansionConfig) -> Self {
        Self { provider, config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ExpansionConfig {
        &self.config
    }

    /// Expand every `@include` directive in `document`, which was loaded from
    /// `path`.
    ///
    /// A document without directives is returned unchanged.
    ///
    /// # Errors
    /// Returns the first [`IncludeError`] met anywhere in the document,
    /// including inside nested includes; no partial result is produced.
    pub fn expand(
        &self,
        document: &FeatureDocument,
        path: &Utf8Path,
    ) -> Result<FeatureDocument, IncludeError> {
        let mut output = Vec::with_capacity(document.len());
        let mut stack = Vec::new();
        let numbered = document
            .lines()
            .iter()
            .enumerate()
            .map(|(idx, line)| (idx.saturating_add(1), line.as_str()));
        self.expand_lines(numbered, path, &mut stack, &mut output)?;
        Ok(FeatureDocument::new(output))
    }

    fn expand_lines<'l, I>(
        &self,
        lines: I,
        path: &Utf8Path,
        stack: &mut Vec<Inclusion>,
        output: &mut Vec<String>,
    ) -> Result<(), IncludeError>
    where
        I: IntoIterator<Item = (usize, &'l str)>,
    {
        // Tags sharing a line with a directive belong to the author's own
        // scenario, so they are held back until every spliced block is out.
        let mut held_tags: Vec<String> = Vec::new();
        for (line_no, line) in lines {
            let Some(directive_line) = DirectiveLine::parse(line) else {
                output.append(&mut held_tags);
                output.push(line.to_owned());
                continue;
            };
            for tag in &directive_line.directives {
                self.splice(tag, path, line_no, stack, output)?;
            }
            if !directive_line.siblings.is_empty() {
                held_tags.push(format!(
                    "{}{}",
                    directive_line.indent,
                    directive_line.siblings.join(" ")
                ));
            }
        }
        output.append(&mut held_tags);
        Ok(())
    }

    fn splice(
        &self,
        tag: &str,
        path: &Utf8Path,
        line_no: usize,
        stack: &mut Vec<Inclusion>,
        output: &mut Vec<String>,
    ) -> Result<(), IncludeError> {
        let directive =
            parse_include_directive(tag).map_err(|source| IncludeError::MalformedDirective {
                path: path.to_owned(),
                line: line_no,
                source,
            })?;
        let block = ScenarioResolver::new(&self.provider).resolve(
            &directive.feature,
            &directive.scenario,
            path,
        )?;

        let inclusion = Inclusion {
            source: block.source.clone(),
            scenario: block.scenario_name.clone(),
        };
        if stack.contains(&inclusion) {
            return Err(IncludeError::CyclicInclusion {
                chain: render_chain(stack, &inclusion),
            });
        }
        if stack.len() >= self.config.max_depth {
            return Err(IncludeError::DepthExceeded {
                limit: self.config.max_depth,
                chain: render_chain(stack, &inclusion),
            });
        }

        let nested = nested_directives(&block, &directive.bindings);
        let body = bind_block(&block, &directive.bindings)?;
        log::debug!(
            "{path}:{line_no}: including '{}' from {} ({} bindings)",
            block.scenario_name,
            block.source,
            directive.bindings.len()
        );

        stack.push(inclusion);
        let numbered_body = body
            .iter()
            .enumerate()
            .map(|(offset, line)| (block.start_line.saturating_add(offset), line.as_str()));
        let lines = nested
            .iter()
            .map(|(line_no, line)| (*line_no, line.as_str()))
            .chain(numbered_body);
        self.expand_lines(lines, &block.source, stack, output)?;
        stack.pop();
        Ok(())
    }
}

fn render_chain(stack: &[Inclusion], last: &Inclusion) -> Vec<String> {
    stack
        .iter()
        .chain(std::iter::once(last))
        .map(ToString::to_string)
        .collect()
}

/// The include directives carried on the block's own tag lines, with the
/// caller's bindings applied. Other tags of the included scenario are dropped.
fn nested_directives(block: &ScenarioBlock, bindings: &Bindings) -> Vec<(usize, String)> {
    let first = block.tag_lines_start();
    block
        .tag_lines
        .iter()
        .enumerate()
        .filter_map(|(offset, line)| {
            let directive_line = DirectiveLine::parse(line)?;
            let tags = directive_line.directives.join(" ");
            Some((
                first.saturating_add(offset),
                format!("{}{}", directive_line.indent, substitute(&tags, bindings)),
            ))
        })
        .collect()
}

/// Apply `bindings` to every line of the block, checking each Examples row
/// for one cell per binding first.
fn bind_block(block: &ScenarioBlock, bindings: &Bindings) -> Result<Vec<String>, IncludeError> {
    if bindings.is_empty() {
        return Ok(block.lines.clone());
    }

    let mut in_examples = false;
    let mut bound = Vec::with_capacity(block.lines.len());
    for line in &block.lines {
        let trimmed = line.trim();
        if EXAMPLES_KEYWORDS.iter().any(|kw| trimmed.starts_with(kw)) {
            in_examples = true;
        } else if trimmed.starts_with('|') {
            if in_examples && !count_matches(trimmed, bindings) {
                return Err(IncludeError::ParamCountMismatch {
                    feature: block.feature_id.clone(),
                    scenario: block.scenario_name.clone(),
                    row: trimmed.to_owned(),
                    expected: bindings.len(),
                    found: row_cell_count(trimmed),
                });
            }
        } else if !trimmed.is_empty() && !trimmed.starts_with('#') {
            in_examples = false;
        }
        bound.push(substitute(line, bindings));
    }
    Ok(bound)
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "tests use explicit failures for clarity")]
mod tests {
    use super::*;
    use crate::ignore::{SkipReason, classify_scenario};
    use crate::provider::MemoryFeatureProvider;
    use rstest::rstest;

    const CALLER: &str = "features/consumer.feature";

    fn expander(files: &[(&str, &str)]) -> InclusionExpander<MemoryFeatureProvider> {
        let mut provider = MemoryFeatureProvider::new();
        for (path, text) in files {
            provider.insert(path, text);
        }
        InclusionExpander::new(provider)
    }

    fn expand(
        expander: &InclusionExpander<MemoryFeatureProvider>,
        text: &str,
    ) -> Result<Vec<String>, IncludeError> {
        expander
            .expand(&FeatureDocument::from_text(text), Utf8Path::new(CALLER))
            .map(FeatureDocument::into_lines)
    }

    const SHARED: &str = concat!(
        "Feature: shared\n",
        "  Scenario: To copy\n",
        "    Given that <time1> is not equal to <time2> into a step\n",
        "\n",
        "  Scenario Outline: Compare\n",
        "    Given <time1> and <time2>\n",
        "    Examples:\n",
        "      | time1 | time2 |\n",
        "      | <time1> | <time2> |\n",
    );

    #[test]
    fn splices_scenario_with_bindings_in_place_of_directive() {
        let expander = expander(&[("features/shared.feature", SHARED)]);
        let lines = expand(
            &expander,
            concat!(
                "Feature: consumer\n",
                "  @include(feature: shared.feature, scenario: To copy, params: [time1:9, time2:8])\n",
                "  Scenario: Own\n",
                "    Then done\n",
            ),
        )
        .expect("expansion should succeed");
        assert_eq!(
            lines,
            vec![
                "Feature: consumer",
                "  Scenario: To copy",
                "    Given that 9 is not equal to 8 into a step",
                "  Scenario: Own",
                "    Then done",
            ]
        );
    }

    #[test]
    fn binds_examples_rows_with_matching_arity() {
        let expander = expander(&[("features/shared.feature", SHARED)]);
        let lines = expand(
            &expander,
            "@include(feature: shared.feature, scenario: Compare, params: [time1:1, time2:2])\n",
        )
        .expect("expansion should succeed");
        assert_eq!(lines.last().map(String::as_str), Some("      | 1 | 2 |"));
        assert!(lines.contains(&"      | time1 | time2 |".to_owned()));
    }

    #[test]
    fn rejects_examples_rows_with_wrong_arity() {
        let expander = expander(&[("features/shared.feature", SHARED)]);
        let result = expand(
            &expander,
            "@include(feature: shared.feature, scenario: Compare, params: [time1:1])\n",
        );
        let Err(IncludeError::ParamCountMismatch {
            expected, found, ..
        }) = result
        else {
            panic!("expected arity mismatch");
        };
        assert_eq!((expected, found), (1, 2));
    }

    #[test]
    fn step_tables_outside_examples_are_not_arity_checked() {
        let expander = expander(&[(
            "features/shared.feature",
            concat!(
                "Scenario: Table\n",
                "  Given users\n",
                "    | name | role | team |\n",
                "    | <who> | admin | core |\n",
            ),
        )]);
        let lines = expand(
            &expander,
            "@include(feature: shared.feature, scenario: Table, params: [who:ann])\n",
        )
        .expect("expansion should succeed");
        assert_eq!(lines.last().map(String::as_str), Some("    | ann | admin | core |"));
    }

    #[test]
    fn document_without_directives_is_unchanged() {
        let expander = expander(&[]);
        let text = "Feature: plain\n  @smoke\n  Scenario: s\n    Given a mention of @include(x)\n";
        let lines = expand(&expander, text).expect("expansion should succeed");
        assert_eq!(lines, FeatureDocument::from_text(text).into_lines());
    }

    #[test]
    fn malformed_directive_aborts_expansion() {
        let expander = expander(&[]);
        let Err(IncludeError::MalformedDirective { path, line, .. }) =
            expand(&expander, "Feature: x\n@include(testCheckParams)\n")
        else {
            panic!("expected malformed directive");
        };
        assert_eq!(path, CALLER);
        assert_eq!(line, 2);
    }

    #[test]
    fn sibling_tags_stay_with_the_authors_scenario() {
        let expander = expander(&[
            (
                "features/base.feature",
                "Feature: base
  Scenario: Open app
    Given the app is open
",
            ),
            (
                "features/lib.feature",
                concat!(
                    "Feature: lib
",
                    "  @include(feature: base.feature, scenario: Open app)
",
                    "  Scenario: Log in
",
                    "    When I log in
",
                ),
            ),
        ]);
        let lines = expand(
            &expander,
            concat!(
                "Feature: consumer
",
                "  @ignore @include(feature: lib.feature, scenario: Log in) @manual
",
                "  Scenario: Parked
",
                "    Given a parked step
",
            ),
        )
        .expect("expansion should succeed");
        assert_eq!(
            lines.get(5..7),
            Some(["  @ignore @manual".to_owned(), "  Scenario: Parked".to_owned()].as_slice())
        );

        let feature = gherkin::Feature::parse(
            FeatureDocument::new(lines).to_text(),
            gherkin::GherkinEnv::default(),
        )
        .expect("expanded text should be valid gherkin");
        let reasons: Vec<(&str, SkipReason)> = feature
            .scenarios
            .iter()
            .map(|scenario| (scenario.name.as_str(), classify_scenario(&feature, scenario)))
            .collect();
        assert_eq!(
            reasons,
            vec![
                ("Open app", SkipReason::None),
                ("Log in", SkipReason::None),
                ("Parked", SkipReason::Manual),
            ]
        );
    }

    #[test]
    fn sibling_tags_follow_every_directive_line_in_a_run() {
        let expander = expander(&[("features/shared.feature", SHARED)]);
        let lines = expand(
            &expander,
            concat!(
                "  @smoke @include(feature: shared.feature, scenario: To copy)
",
                "  @include(feature: shared.feature, scenario: To copy)
",
                "  Scenario: Own
",
            ),
        )
        .expect("expansion should succeed");
        assert_eq!(
            lines,
            vec![
                "  Scenario: To copy",
                "    Given that <time1> is not equal to <time2> into a step",
                "  Scenario: To copy",
                "    Given that <time1> is not equal to <time2> into a step",
                "  @smoke",
                "  Scenario: Own",
            ]
        );
    }

    #[test]
    fn malformed_nested_directive_reports_its_own_file_and_line() {
        let expander = expander(&[(
            "features/lib.feature",
            concat!(
                "Feature: lib
",
                "
",
                "  @include(feature: x.feature)
",
                "  Scenario: Log in
",
                "    When I log in
",
            ),
        )]);
        let Err(IncludeError::MalformedDirective { path, line, source }) = expand(
            &expander,
            "Feature: consumer
  @include(feature: lib.feature, scenario: Log in)
",
        ) else {
            panic!("expected malformed nested directive");
        };
        assert_eq!(path, "features/lib.feature");
        assert_eq!(line, 3);
        assert_eq!(source, bdd_include_patterns::DirectiveError::MissingField("scenario"));
    }

    #[test]
    fn expands_nested_includes_with_forwarded_bindings() {
        let expander = expander(&[
            (
                "features/base.feature",
                "  Scenario: Open app\n    Given the app is open for <who>\n",
            ),
            (
                "features/login.feature",
                concat!(
                    "  @ignore @include(feature: base.feature, scenario: Open app, params: [who:<user>])\n",
                    "  Scenario: Log in\n",
                    "    When <user> logs in\n",
                ),
            ),
        ]);
        let lines = expand(
            &expander,
            "@include(feature: login.feature, scenario: Log in, params: [user:bob])\n",
        )
        .expect("expansion should succeed");
        assert_eq!(
            lines,
            vec![
                "  Scenario: Open app",
                "    Given the app is open for bob",
                "  Scenario: Log in",
                "    When bob logs in",
            ]
        );
    }

    #[rstest]
    #[case::self_include(
        &[(
            "features/loop.feature",
            "@include(feature: loop.feature, scenario: Loop)\nScenario: Loop\n  Given again\n",
        )],
        "features/loop.feature:Loop -> features/loop.feature:Loop"
    )]
    #[case::mutual_include(
        &[
            (
                "features/a.feature",
                "@include(feature: b.feature, scenario: B)\nScenario: A\n  Given a\n",
            ),
            (
                "features/b.feature",
                "@include(feature: a.feature, scenario: A)\nScenario: B\n  Given b\n",
            ),
        ],
        "features/a.feature:A -> features/b.feature:B -> features/a.feature:A"
    )]
    fn detects_cyclic_inclusion(#[case] files: &[(&str, &str)], #[case] expected_chain: &str) {
        let expander = expander(files);
        let first = files.first().map(|(path, _)| *path).unwrap_or_default();
        let scenario = if first.ends_with("loop.feature") { "Loop" } else { "A" };
        let directive = format!(
            "@include(feature: {}, scenario: {scenario})\n",
            first.trim_start_matches("features/")
        );
        let Err(IncludeError::CyclicInclusion { chain }) = expand(&expander, &directive) else {
            panic!("expected cyclic inclusion");
        };
        assert_eq!(chain.join(" -> "), expected_chain);
    }

    #[test]
    fn depth_limit_stops_deep_nesting() {
        let provider = {
            let mut provider = MemoryFeatureProvider::new();
            provider.insert(
                "features/outer.feature",
                "@include(feature: inner.feature, scenario: Inner)\nScenario: Outer\n",
            );
            provider.insert("features/inner.feature", "Scenario: Inner\n");
            provider
        };
        let expander =
            InclusionExpander::with_config(provider, ExpansionConfig::default().with_max_depth(1));
        let result = expander.expand(
            &FeatureDocument::from_text("@include(feature: outer.feature, scenario: Outer)\n"),
            Utf8Path::new(CALLER),
        );
        assert!(matches!(
            result,
            Err(IncludeError::DepthExceeded { limit: 1, .. })
        ));
    }

    #[test]
    fn repeated_includes_resolve_independently() {
        let expander = expander(&[("features/shared.feature", SHARED)]);
        let lines = expand(
            &expander,
            concat!(
                "@include(feature: shared.feature, scenario: To copy, params: [time1:1, time2:2])\n",
                "@include(feature: shared.feature, scenario: To copy, params: [time1:3, time2:4])\n",
            ),
        )
        .expect("expansion should succeed");
        assert_eq!(
            lines,
            vec![
                "  Scenario: To copy",
                "    Given that 1 is not equal to 2 into a step",
                "  Scenario: To copy",
                "    Given that 3 is not equal to 4 into a step",
            ]
        );
    }

    #[test]
    fn missing_scenario_aborts_expansion() {
        let expander = expander(&[("features/shared.feature", SHARED)]);
        let result = expand(
            &expander,
            "@include(feature: shared.feature, scenario: Nope)\nScenario: kept\n",
        );
        assert!(matches!(result, Err(IncludeError::ScenarioNotFound { .. })));
    }
}
