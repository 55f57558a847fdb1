//! Fixture helpers for DirMirror tests
//!
//! Layouts are described as relative paths. A path ending in `/` is a
//! directory, anything else is a file whose content is its own path.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// A source/destination pair of temporary directories
pub struct Fixture {
    /// Source root
    pub source: TempDir,
    /// Destination root
    pub destination: TempDir,
}

impl Fixture {
    /// Create both roots and populate them
    pub fn new(source_entries: &[&str], destination_entries: &[&str]) -> Self {
        let source = TempDir::new().expect("Failed to create source directory");
        let destination = TempDir::new().expect("Failed to create destination directory");
        populate(source.path(), source_entries);
        populate(destination.path(), destination_entries);
        Self {
            source,
            destination,
        }
    }

    /// Source root path
    pub fn source_path(&self) -> &Path {
        self.source.path()
    }

    /// Destination root path
    pub fn destination_path(&self) -> &Path {
        self.destination.path()
    }
}

/// Create every entry of `entries` below `root`
pub fn populate(root: &Path, entries: &[&str]) {
    for entry in entries {
        if let Some(dir) = entry.strip_suffix('/') {
            fs::create_dir_all(root.join(dir)).expect("Failed to create test directory");
        } else {
            write_file(root, entry, entry.as_bytes());
        }
    }
}

/// Write a file below `root`, creating its parents
pub fn write_file(root: &Path, relative: &str, contents: &[u8]) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(&path, contents).expect("Failed to write test file");
    path
}

/// Relative paths of every entry below `root`, directories suffixed with `/`
pub fn snapshot(root: &Path) -> BTreeSet<String> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| {
            let relative = entry
                .path()
                .strip_prefix(root)
                .expect("walked path is below its root")
                .to_string_lossy()
                .replace('\\', "/");
            if entry.file_type().is_dir() {
                format!("{}/", relative)
            } else {
                relative
            }
        })
        .collect()
}

/// Relative paths of the files below `root`
pub fn file_snapshot(root: &Path) -> BTreeSet<String> {
    snapshot(root)
        .into_iter()
        .filter(|path| !path.ends_with('/'))
        .collect()
}
