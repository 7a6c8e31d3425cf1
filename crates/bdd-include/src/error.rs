//! Error types for scenario inclusion.
//!
//! Every [`IncludeError`] is fatal to the document being expanded: the host
//! must fail loading that document rather than run it partially expanded.

use bdd_include_patterns::DirectiveError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while expanding `@include` directives.
#[derive(Debug, Error)]
pub enum IncludeError {
    /// A directive does not satisfy the include grammar.
    #[error("malformed @include directive at {path}:{line}: {source}")]
    MalformedDirective {
        /// Document holding the directive.
        path: Utf8PathBuf,
        /// 1-based line of the directive.
        line: usize,
        /// Grammar failure.
        #[source]
        source: DirectiveError,
    },

    /// The referenced feature could not be loaded.
    #[error("feature '{feature}' included from {caller} could not be found: {source}")]
    FeatureNotFound {
        /// Feature id as written in the directive.
        feature: String,
        /// Document holding the directive.
        caller: Utf8PathBuf,
        /// Provider failure.
        #[source]
        source: ProviderError,
    },

    /// The feature exists but holds no scenario with the requested name.
    #[error("scenario '{scenario}' not found in feature '{feature}'")]
    ScenarioNotFound {
        /// Feature id as written in the directive.
        feature: String,
        /// Requested scenario name.
        scenario: String,
    },

    /// An Examples row has a different number of cells than bindings.
    #[error(
        "Examples row `{row}` of scenario '{scenario}' in '{feature}' has {found} cells \
         but the directive binds {expected} parameters"
    )]
    ParamCountMismatch {
        /// Feature id as written in the directive.
        feature: String,
        /// Included scenario name.
        scenario: String,
        /// The offending row, trimmed.
        row: String,
        /// Number of bindings supplied.
        expected: usize,
        /// Number of cells in the row.
        found: usize,
    },

    /// A scenario includes itself, directly or transitively.
    #[error("cyclic @include: {}", .chain.join(" -> "))]
    CyclicInclusion {
        /// Inclusion chain ending with the repeated scenario.
        chain: Vec<String>,
    },

    /// Nested inclusion went deeper than the configured limit.
    #[error("@include nesting exceeds the limit of {limit}: {}", .chain.join(" -> "))]
    DepthExceeded {
        /// Configured maximum depth.
        limit: usize,
        /// Inclusion chain at the point the limit was hit.
        chain: Vec<String>,
    },
}

/// Errors reported by a [`FeatureProvider`](crate::FeatureProvider).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No candidate location holds the feature.
    #[error("no feature file '{feature}' (searched: {})", display_paths(.searched))]
    NotFound {
        /// Feature id as requested.
        feature: String,
        /// Locations tried, in order.
        searched: Vec<Utf8PathBuf>,
    },

    /// The feature exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that failed to read.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

fn display_paths(paths: &[Utf8PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_owned();
    }
    paths
        .iter()
        .map(|path| path.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held an unusable value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
