//! Skip classification for scenarios tagged `@ignore`.
//!
//! The host runner calls [`classify`] before running a scenario. When the
//! result [`is_skipped`](SkipReason::is_skipped), the scenario must not run;
//! [`report_skip`] logs the reason the way the runner is expected to surface
//! it. Classification never fails.

use std::sync::LazyLock;

use regex::Regex;

const IGNORE: &str = "@ignore";
const ENV_CONDITION: &str = "@envCondition";
const UNIMPLEMENTED: &str = "@unimplemented";
const MANUAL: &str = "@manual";
const TOO_COMPLEX: &str = "@toocomplex";

static TICKET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@tillfixed\((.*?)\)").unwrap_or_else(|_| unreachable!("ticket regex is valid"))
});

/// Why a scenario is skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The scenario is not tagged `@ignore` and runs normally.
    None,
    /// `@envCondition`: skipped because of the execution environment.
    EnvCondition,
    /// `@unimplemented`: the steps do not exist yet.
    Unimplemented,
    /// `@manual`: the scenario is executed by hand.
    Manual,
    /// `@toocomplex`: the scenario is too complex to automate.
    TooComplex,
    /// `@tillfixed(<ticket>)`: blocked by the named ticket.
    TicketReference(String),
    /// `@ignore` without a recognised reason tag.
    NoReasonGiven,
}

impl SkipReason {
    /// Returns `true` for every reason except [`SkipReason::None`].
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// The warning a runner should emit for `scenario`, if any.
    ///
    /// Scenarios skipped for an environment condition are skipped silently.
    ///
    /// # Examples
    /// ```
    /// use bdd_include::SkipReason;
    /// assert_eq!(
    ///     SkipReason::TicketReference("QA-12".into()).warning("Login"),
    ///     Some("Scenario 'Login' ignored because of ticket: QA-12".to_owned())
    /// );
    /// assert_eq!(SkipReason::EnvCondition.warning("Login"), None);
    /// ```
    #[must_use]
    pub fn warning(&self, scenario: &str) -> Option<String> {
        let reason = match self {
            Self::None | Self::EnvCondition => return None,
            Self::NoReasonGiven => {
                return Some(format!("Scenario '{scenario}' ignored, no reason specified."));
            }
            Self::TicketReference(ticket) => format!("because of ticket: {ticket}"),
            Self::Unimplemented => "because it is not yet implemented.".to_owned(),
            Self::Manual => "because it is marked as manual test.".to_owned(),
            Self::TooComplex => "because the test is too complex.".to_owned(),
        };
        Some(format!("Scenario '{scenario}' ignored {reason}"))
    }
}

/// Classify a scenario from its tags.
///
/// Tags may be given with or without the leading `@`. Without `@ignore` the
/// result is [`SkipReason::None`]. Otherwise the reason tags are checked in
/// the order ticket, environment condition, unimplemented, manual, too
/// complex, and the last one present decides the result.
///
/// # Examples
/// ```
/// use bdd_include::{SkipReason, classify};
/// assert_eq!(classify(["@ignore", "@tillfixed(QA-7)"]), SkipReason::TicketReference("QA-7".into()));
/// assert_eq!(classify(["ignore", "manual", "unimplemented"]), SkipReason::Manual);
/// assert_eq!(classify(["@smoke"]), SkipReason::None);
/// ```
#[must_use]
pub fn classify<'a, I>(tags: I) -> SkipReason
where
    I: IntoIterator<Item = &'a str>,
{
    let tags: Vec<String> = tags.into_iter().map(normalise_tag).collect();
    let has = |wanted: &str| tags.iter().any(|tag| tag == wanted);
    if !has(IGNORE) {
        return SkipReason::None;
    }

    let mut reason = SkipReason::NoReasonGiven;
    for tag in &tags {
        if let Some(ticket) = TICKET_RE.captures(tag).and_then(|caps| caps.get(1)) {
            reason = SkipReason::TicketReference(ticket.as_str().to_owned());
        }
    }
    for (tag, candidate) in [
        (ENV_CONDITION, SkipReason::EnvCondition),
        (UNIMPLEMENTED, SkipReason::Unimplemented),
        (MANUAL, SkipReason::Manual),
        (TOO_COMPLEX, SkipReason::TooComplex),
    ] {
        if has(tag) {
            reason = candidate;
        }
    }
    reason
}

/// Classify a parsed scenario, merging its tags with its feature's tags.
#[must_use]
pub fn classify_scenario(feature: &gherkin::Feature, scenario: &gherkin::Scenario) -> SkipReason {
    classify(
        feature
            .tags
            .iter()
            .chain(&scenario.tags)
            .map(String::as_str),
    )
}

/// Log the skip of `scenario` at `warn` level when `reason` carries a
/// warning.
pub fn report_skip(scenario: &str, reason: &SkipReason) {
    if let Some(message) = reason.warning(scenario) {
        log::warn!("{message}");
    }
}

fn normalise_tag(tag: &str) -> String {
    let trimmed = tag.trim();
    if trimmed.starts_with('@') {
        trimmed.to_owned()
    } else {
        format!("@{trimmed}")
    }
}
