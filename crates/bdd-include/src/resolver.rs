//! Locates a named scenario in a feature document and copies its lines.

use bdd_include_patterns::is_tag_line;
use camino::Utf8Path;

use crate::document::ScenarioBlock;
use crate::error::IncludeError;
use crate::provider::FeatureProvider;

const SCENARIO_KEYWORDS: [&str; 2] = ["Scenario Outline:", "Scenario:"];
const RULE_KEYWORD: &str = "Rule:";

/// Finds scenarios through a [`FeatureProvider`].
///
/// Every call re-reads the referenced document; nothing is cached between
/// lookups.
#[derive(Clone, Copy, Debug)]
pub struct ScenarioResolver<'p, P: ?Sized> {
    provider: &'p P,
}

impl<'p, P: FeatureProvider + ?Sized> ScenarioResolver<'p, P> {
    /// Create a resolver reading documents from `provider`.
    #[must_use]
    pub fn new(provider: &'p P) -> Self {
        Self { provider }
    }

    /// Copy the scenario `scenario_name` out of the feature `feature_id`,
    /// resolving the feature relative to `caller`.
    ///
    /// # Errors
    /// - [`IncludeError::FeatureNotFound`] when the provider cannot load the
    ///   feature.
    /// - [`IncludeError::ScenarioNotFound`] when no `Scenario:` or
    ///   `Scenario Outline:` header carries exactly that name.
    pub fn resolve(
        &self,
        feature_id: &str,
        scenario_name: &str,
        caller: &Utf8Path,
    ) -> Result<ScenarioBlock, IncludeError> {
        let loaded = self
            .provider
            .load_document(feature_id, caller)
            .map_err(|source| IncludeError::FeatureNotFound {
                feature: feature_id.to_owned(),
                caller: caller.to_owned(),
                source,
            })?;

        let lines = loaded.document.lines();
        let start = lines
            .iter()
            .position(|line| scenario_header_name(line) == Some(scenario_name))
            .ok_or_else(|| IncludeError::ScenarioNotFound {
                feature: feature_id.to_owned(),
                scenario: scenario_name.to_owned(),
            })?;

        let preamble = lines.get(..start).unwrap_or_default();
        let tags_from = preamble
            .iter()
            .rposition(|line| !is_tag_line(line))
            .map_or(0, |idx| idx.saturating_add(1));
        let tag_lines = preamble.get(tags_from..).unwrap_or_default().to_vec();

        let body = lines.get(start..).unwrap_or_default();
        let mut block: Vec<String> = body
            .iter()
            .enumerate()
            .take_while(|(offset, line)| *offset == 0 || !ends_block(line))
            .map(|(_, line)| line.clone())
            .collect();
        trim_trailing_preamble(&mut block);

        log::trace!(
            "resolved scenario '{scenario_name}' in {} ({} lines)",
            loaded.path,
            block.len()
        );
        Ok(ScenarioBlock {
            feature_id: feature_id.to_owned(),
            source: loaded.path,
            scenario_name: scenario_name.to_owned(),
            start_line: start.saturating_add(1),
            tag_lines,
            lines: block,
        })
    }
}

/// The trimmed name of a `Scenario:` or `Scenario Outline:` header.
///
/// # Examples
/// ```
/// use bdd_include::scenario_header_name;
/// assert_eq!(scenario_header_name("  Scenario Outline:  To copy "), Some("To copy"));
/// assert_eq!(scenario_header_name("    Given a step"), None);
/// ```
#[must_use]
pub fn scenario_header_name(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    SCENARIO_KEYWORDS
        .iter()
        .find_map(|keyword| trimmed.strip_prefix(keyword))
        .map(str::trim)
}

fn ends_block(line: &str) -> bool {
    scenario_header_name(line).is_some() || line.trim_start().starts_with(RULE_KEYWORD)
}

/// Drop the tag lines and blank lines that introduce the next section.
fn trim_trailing_preamble(block: &mut Vec<String>) {
    while block.len() > 1
        && block
            .last()
            .is_some_and(|line| line.trim().is_empty() || is_tag_line(line))
    {
        block.pop();
    }
}
