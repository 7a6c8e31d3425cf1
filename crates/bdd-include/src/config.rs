//! Expansion configuration parsed from environment variables.
//!
//! All settings can be overridden via environment variables prefixed with
//! `BDD_INCLUDE_`.

use std::env;

use camino::Utf8PathBuf;

use crate::error::ConfigError;

/// Default limit on nested `@include` depth.
pub const DEFAULT_MAX_DEPTH: usize = 32;

const FEATURES_ROOT_VAR: &str = "BDD_INCLUDE_FEATURES_ROOT";
const MAX_DEPTH_VAR: &str = "BDD_INCLUDE_MAX_DEPTH";

/// Configuration for the inclusion engine.
///
/// # Environment Variables
///
/// - `BDD_INCLUDE_FEATURES_ROOT`: directory searched for a feature id that
///   does not resolve next to the including document
/// - `BDD_INCLUDE_MAX_DEPTH`: maximum nesting of `@include` directives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionConfig {
    /// Fallback directory for resolving feature ids.
    pub features_root: Option<Utf8PathBuf>,
    /// Maximum nesting of included scenarios.
    pub max_depth: usize,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            features_root: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ExpansionConfig {
    /// Load configuration from environment variables.
    ///
    /// Falls back to defaults for missing values. An empty
    /// `BDD_INCLUDE_FEATURES_ROOT` is treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `BDD_INCLUDE_MAX_DEPTH` is not a
    /// positive integer or a variable is not valid Unicode.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name))
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// [`ExpansionConfig::from_env`] delegates here with [`std::env::var`];
    /// hosts that keep settings elsewhere can supply their own lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] under the same conditions as
    /// [`ExpansionConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let features_root = match lookup(FEATURES_ROOT_VAR) {
            Ok(val) if val.trim().is_empty() => None,
            Ok(val) => Some(Utf8PathBuf::from(val.trim())),
            Err(env::VarError::NotPresent) => None,
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigError::Invalid(format!(
                    "{FEATURES_ROOT_VAR} is not valid UTF-8"
                )));
            }
        };

        let max_depth = match lookup(MAX_DEPTH_VAR) {
            Ok(val) => parse_max_depth(&val)?,
            Err(env::VarError::NotPresent) => DEFAULT_MAX_DEPTH,
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ConfigError::Invalid(format!(
                    "{MAX_DEPTH_VAR} is not valid UTF-8"
                )));
            }
        };

        Ok(Self {
            features_root,
            max_depth,
        })
    }

    /// Apply optional overrides to an existing configuration.
    ///
    /// Intended for host settings that should take precedence over
    /// environment-based defaults.
    #[must_use]
    pub fn apply_overrides(
        mut self,
        features_root: Option<Utf8PathBuf>,
        max_depth: Option<usize>,
    ) -> Self {
        if let Some(root) = features_root {
            self.features_root = Some(root);
        }

        if let Some(depth) = max_depth {
            self.max_depth = depth;
        }

        self
    }

    /// Create a new configuration with the given features root.
    #[must_use]
    pub fn with_features_root(mut self, root: impl Into<Utf8PathBuf>) -> Self {
        self.features_root = Some(root.into());
        self
    }

    /// Create a new configuration with the given depth limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

fn parse_max_depth(value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(depth) if depth > 0 => Ok(depth),
        _ => Err(ConfigError::Invalid(format!(
            "invalid {MAX_DEPTH_VAR} value '{value}', expected a positive integer"
        ))),
    }
}

#[cfg(test)]
#[expect(
    clippy::unwrap_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(
        vars: &[(&'static str, &'static str)],
    ) -> impl Fn(&str) -> Result<String, env::VarError> {
        let vars: HashMap<&str, &str> = vars.iter().copied().collect();
        move |name| {
            vars.get(name)
                .map(|value| (*value).to_owned())
                .ok_or(env::VarError::NotPresent)
        }
    }

    #[test]
    fn default_values() {
        let config = ExpansionConfig::default();
        assert_eq!(config.features_root, None);
        assert_eq!(config.max_depth, 32);
    }

    #[test]
    fn lookup_uses_defaults_when_unset() {
        let config = ExpansionConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ExpansionConfig::default());
    }

    #[test]
    fn lookup_reads_both_variables() {
        let config = ExpansionConfig::from_lookup(lookup_from(&[
            (FEATURES_ROOT_VAR, "features"),
            (MAX_DEPTH_VAR, " 4 "),
        ]))
        .unwrap();
        assert_eq!(config.features_root, Some(Utf8PathBuf::from("features")));
        assert_eq!(config.max_depth, 4);
    }

    #[test]
    fn lookup_treats_blank_root_as_unset() {
        let config =
            ExpansionConfig::from_lookup(lookup_from(&[(FEATURES_ROOT_VAR, "  ")])).unwrap();
        assert_eq!(config.features_root, None);
    }

    #[test]
    fn lookup_rejects_non_unicode_root() {
        let result = ExpansionConfig::from_lookup(|name| {
            if name == FEATURES_ROOT_VAR {
                Err(env::VarError::NotUnicode(std::ffi::OsString::new()))
            } else {
                Err(env::VarError::NotPresent)
            }
        });
        assert!(result.unwrap_err().to_string().contains("not valid UTF-8"));
    }

    #[test]
    fn lookup_rejects_non_unicode_max_depth() {
        let result = ExpansionConfig::from_lookup(|name| {
            if name == MAX_DEPTH_VAR {
                Err(env::VarError::NotUnicode(std::ffi::OsString::new()))
            } else {
                Err(env::VarError::NotPresent)
            }
        });
        assert_eq!(
            result.unwrap_err().to_string(),
            "invalid configuration: BDD_INCLUDE_MAX_DEPTH is not valid UTF-8"
        );
    }

    #[rstest]
    #[case("0")]
    #[case("-1")]
    #[case("deep")]
    fn lookup_rejects_bad_depth(#[case] value: &'static str) {
        let err =
            ExpansionConfig::from_lookup(lookup_from(&[(MAX_DEPTH_VAR, value)])).unwrap_err();
        assert!(err.to_string().contains("expected a positive integer"));
    }

    #[test]
    fn apply_overrides_updates_selected_fields() {
        let config = ExpansionConfig::default().apply_overrides(Some("specs".into()), Some(2));
        assert_eq!(config.features_root, Some(Utf8PathBuf::from("specs")));
        assert_eq!(config.max_depth, 2);

        let config = ExpansionConfig::default().apply_overrides(None, None);
        assert_eq!(config, ExpansionConfig::default());
    }

    #[test]
    fn builders_set_fields() {
        let config = ExpansionConfig::default()
            .with_features_root("root")
            .with_max_depth(7);
        assert_eq!(config.features_root, Some(Utf8PathBuf::from("root")));
        assert_eq!(config.max_depth, 7);
    }
}
