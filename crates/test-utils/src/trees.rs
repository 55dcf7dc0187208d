//! Temporary directory scaffolding for pipeline-shaped tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A disposable directory tree rooted in a [`TempDir`].
pub struct FixtureTree {
    root: TempDir,
}

impl FixtureTree {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("create fixture tree"),
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Create (and return) a subdirectory, parents included.
    pub fn dir(&self, relative: &str) -> PathBuf {
        let path = self.root.path().join(relative);
        fs::create_dir_all(&path).expect("create fixture dir");
        path
    }

    /// Write a small file with the given contents.
    pub fn file(&self, relative: &str, contents: &[u8]) -> PathBuf {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture parent");
        }
        fs::write(&path, contents).expect("write fixture file");
        path
    }
}

impl Default for FixtureTree {
    fn default() -> Self {
        Self::new()
    }
}
