//! Scenario inclusion for Gherkin feature files.
//!
//! A scenario tagged `@include(feature: <id>, scenario: <name>, params: [...])`
//! pulls the named scenario from another feature file into the current one,
//! binding `<placeholder>` tokens to the supplied values. The host runner calls
//! [`InclusionExpander::expand`] once per document before loading it and
//! [`classify`] before each scenario to honour `@ignore` tags.
//!
//! # Examples
//!
//! ```
//! use bdd_include::{FeatureDocument, InclusionExpander, MemoryFeatureProvider};
//! use camino::Utf8Path;
//!
//! let mut provider = MemoryFeatureProvider::new();
//! provider.insert("features/base.feature", "Scenario: Open\n  Given the app\n");
//!
//! let document = FeatureDocument::from_text("@include(feature: base.feature, scenario: Open)\n");
//! let expanded = InclusionExpander::new(provider)
//!     .expand(&document, Utf8Path::new("features/main.feature"))
//!     .unwrap();
//! assert_eq!(expanded.to_text(), "Scenario: Open\n  Given the app\n");
//! ```

mod config;
mod document;
mod error;
mod expander;
mod ignore;
mod provider;
mod resolver;

pub use bdd_include_patterns::{
    Binding, Bindings, DirectiveError, IncludeDirective, count_matches, is_include_tag,
    parse_include_directive, substitute,
};
pub use config::{DEFAULT_MAX_DEPTH, ExpansionConfig};
pub use document::{FeatureDocument, ScenarioBlock};
pub use error::{ConfigError, IncludeError, ProviderError};
pub use expander::InclusionExpander;
pub use ignore::{SkipReason, classify, classify_scenario, report_skip};
pub use provider::{FeatureProvider, FsFeatureProvider, LoadedFeature, MemoryFeatureProvider};
pub use resolver::{ScenarioResolver, scenario_header_name};
