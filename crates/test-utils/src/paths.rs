//! Scratch locations for tests that write grid files.

use std::path::{Path, PathBuf};

/// Creates a temporary directory for test output.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Basename for a binary pair inside `dir` (no extension).
pub fn basename_in(dir: &Path, name: &str) -> PathBuf {
    dir.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_test_dir() {
        let dir = temp_test_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_basename_in() {
        let dir = temp_test_dir();
        let base = basename_in(dir.path(), "dem");
        assert_eq!(base.parent(), Some(dir.path()));
        assert!(base.extension().is_none());
    }
}
