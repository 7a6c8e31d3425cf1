//! Helpers for writing feature trees to a temporary directory.

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// A temporary directory holding feature files.
pub struct FeatureTree {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl FeatureTree {
    /// Create an empty tree.
    ///
    /// # Panics
    /// Panics when the temporary directory cannot be created or is not UTF-8.
    #[expect(clippy::expect_used, reason = "test fixture setup fails loudly")]
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");
        Self { _dir: dir, root }
    }

    /// The tree's root directory.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Write `text` to `relative`, creating parent directories, and return the
    /// absolute path.
    ///
    /// # Panics
    /// Panics when the file cannot be written.
    #[expect(clippy::expect_used, reason = "test fixture setup fails loudly")]
    pub fn write(&self, relative: &str, text: &str) -> Utf8PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create feature directory");
        }
        std::fs::write(&path, text).expect("write feature file");
        path
    }
}
