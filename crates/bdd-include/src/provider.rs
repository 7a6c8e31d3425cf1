//! Resolves feature ids to feature documents.
//!
//! A feature id is resolved relative to the directory of the including
//! document first and then, when configured, relative to a features root.
//! Absolute ids are used as given. Filesystem reads go through `cap-std` so
//! each lookup is confined to the directory it names.

use std::collections::HashMap;
use std::io;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};

use crate::config::ExpansionConfig;
use crate::document::FeatureDocument;
use crate::error::ProviderError;

/// A feature document together with the path it was loaded from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedFeature {
    /// Resolved location; nested includes resolve relative to it.
    pub path: Utf8PathBuf,
    /// The document's lines.
    pub document: FeatureDocument,
}

/// Source of feature documents for the resolver.
///
/// Implementations must be free of side effects: loading the same id twice
/// yields the same document.
pub trait FeatureProvider {
    /// Load the feature named `feature_id`, as referenced from the document
    /// at `relative_to`.
    ///
    /// # Errors
    /// Returns [`ProviderError::NotFound`] when no candidate location holds
    /// the feature and [`ProviderError::Read`] when a candidate exists but
    /// cannot be read.
    fn load_document(
        &self,
        feature_id: &str,
        relative_to: &Utf8Path,
    ) -> Result<LoadedFeature, ProviderError>;
}

impl<P: FeatureProvider + ?Sized> FeatureProvider for &P {
    fn load_document(
        &self,
        feature_id: &str,
        relative_to: &Utf8Path,
    ) -> Result<LoadedFeature, ProviderError> {
        (**self).load_document(feature_id, relative_to)
    }
}

/// Reads feature files from disk.
#[derive(Clone, Debug, Default)]
pub struct FsFeatureProvider {
    features_root: Option<Utf8PathBuf>,
}

impl FsFeatureProvider {
    /// A provider resolving ids next to the including document only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider using the configuration's features root as a fallback.
    #[must_use]
    pub fn from_config(config: &ExpansionConfig) -> Self {
        Self {
            features_root: config.features_root.clone(),
        }
    }

    /// Set the fallback directory for feature ids.
    #[must_use]
    pub fn with_features_root(mut self, root: impl Into<Utf8PathBuf>) -> Self {
        self.features_root = Some(root.into());
        self
    }
}

impl FeatureProvider for FsFeatureProvider {
    fn load_document(
        &self,
        feature_id: &str,
        relative_to: &Utf8Path,
    ) -> Result<LoadedFeature, ProviderError> {
        let searched = candidate_paths(feature_id, relative_to, self.features_root.as_deref());
        for candidate in &searched {
            match read_with_cap_std(candidate) {
                Ok(text) => {
                    log::trace!("loaded feature '{feature_id}' from {candidate}");
                    return Ok(LoadedFeature {
                        path: candidate.clone(),
                        document: FeatureDocument::from_text(&text),
                    });
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(ProviderError::Read {
                        path: candidate.clone(),
                        source,
                    });
                }
            }
        }
        Err(ProviderError::NotFound {
            feature: feature_id.to_owned(),
            searched,
        })
    }
}

fn read_with_cap_std(path: &Utf8Path) -> io::Result<String> {
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, format!("{path} has no file name"))
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read_to_string(name)
}

/// Serves feature documents held in memory, keyed by path.
///
/// Useful for hosts that already hold feature text and for tests.
///
/// # Examples
/// ```
/// use bdd_include::{FeatureProvider, MemoryFeatureProvider};
/// use camino::Utf8Path;
///
/// let mut provider = MemoryFeatureProvider::new();
/// provider.insert("features/login.feature", "Feature: Login\n");
/// let loaded = provider
///     .load_document("login.feature", Utf8Path::new("features/checkout.feature"))
///     .unwrap();
/// assert_eq!(loaded.path, "features/login.feature");
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryFeatureProvider {
    features: HashMap<Utf8PathBuf, FeatureDocument>,
    features_root: Option<Utf8PathBuf>,
}

impl MemoryFeatureProvider {
    /// An empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback directory for feature ids.
    #[must_use]
    pub fn with_features_root(mut self, root: impl Into<Utf8PathBuf>) -> Self {
        self.features_root = Some(root.into());
        self
    }

    /// Register feature text under `path`, replacing any previous entry.
    pub fn insert(&mut self, path: impl AsRef<Utf8Path>, text: &str) {
        self.features.insert(
            normalise_lexically(path.as_ref()),
            FeatureDocument::from_text(text),
        );
    }
}

impl FeatureProvider for MemoryFeatureProvider {
    fn load_document(
        &self,
        feature_id: &str,
        relative_to: &Utf8Path,
    ) -> Result<LoadedFeature, ProviderError> {
        let searched = candidate_paths(feature_id, relative_to, self.features_root.as_deref());
        searched
            .iter()
            .find_map(|candidate| {
                self.features.get(candidate).map(|document| LoadedFeature {
                    path: candidate.clone(),
                    document: document.clone(),
                })
            })
            .ok_or_else(|| ProviderError::NotFound {
                feature: feature_id.to_owned(),
                searched,
            })
    }
}

/// Candidate locations for `feature_id`, in lookup order and without
/// duplicates.
fn candidate_paths(
    feature_id: &str,
    relative_to: &Utf8Path,
    features_root: Option<&Utf8Path>,
) -> Vec<Utf8PathBuf> {
    let id = Utf8Path::new(feature_id);
    if id.is_absolute() {
        return vec![normalise_lexically(id)];
    }

    let base = relative_to.parent().unwrap_or_else(|| Utf8Path::new(""));
    let mut candidates = vec![normalise_lexically(&base.join(id))];
    if let Some(root) = features_root {
        let rooted = normalise_lexically(&root.join(id));
        if !candidates.contains(&rooted) {
            candidates.push(rooted);
        }
    }
    candidates
}

/// Remove `.` components and fold `..` into its parent without touching the
/// filesystem.
fn normalise_lexically(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Utf8Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_str()),
        }
    }
    out
}
