//! Test utilities for projgen unit tests.
//!
//! [`MockFileSystem`] is an in-memory [`SourceTree`] so discovery can be
//! tested without touching disk; [`fixtures`] builds whole source trees
//! (on disk or in memory) for orchestrator tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use projgen::test_support::MockFileSystem;
//!
//! let mut fs = MockFileSystem::new();
//! fs.add_file("zlib/adler32.c", "");
//! assert_eq!(fs.list_files("zlib"), vec!["adler32.c"]);
//! ```

pub mod fixtures;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::ops::discover::SourceTree;

// Re-export fixtures for convenience
pub use fixtures::*;

/// Mock filesystem for testing without real I/O.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: BTreeMap<PathBuf, Vec<u8>>,
}

impl MockFileSystem {
    /// Create a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.files.insert(path.as_ref().to_path_buf(), content.into());
    }

    /// Get all files (for debugging).
    pub fn all_files(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }
}

impl SourceTree for MockFileSystem {
    fn list_files(&self, dir: &str) -> Vec<String> {
        let dir = Path::new(dir);
        self.files
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .filter_map(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect()
    }

    fn is_file(&self, path: &str) -> bool {
        self.files.contains_key(Path::new(path))
    }

    fn read_to_string(&self, path: &str) -> Option<String> {
        self.files
            .get(Path::new(path))
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fs_lists_direct_children_sorted() {
        let mut fs = MockFileSystem::new();
        fs.add_file("coders/png.c", "");
        fs.add_file("coders/bmp.c", "");
        fs.add_file("coders/win/png.c", "");

        assert_eq!(fs.list_files("coders"), vec!["bmp.c", "png.c"]);
        assert_eq!(fs.list_files("coders/win"), vec!["png.c"]);
        assert!(fs.list_files("missing").is_empty());
    }

    #[test]
    fn test_mock_fs_is_file() {
        let mut fs = MockFileSystem::new();
        fs.add_file("a/b.c", "int x;");
        assert!(fs.is_file("a/b.c"));
        assert!(!fs.is_file("a"));
        assert_eq!(fs.read_to_string("a/b.c").as_deref(), Some("int x;"));
        assert_eq!(fs.all_files().count(), 1);
    }
}
