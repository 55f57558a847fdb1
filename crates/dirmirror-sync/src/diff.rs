//! Detection of entries missing from a destination tree
//!
//! The comparison is existence based: an entry present on both sides is never
//! reported, whatever its content. A name that is a file on one side and a
//! directory on the other also counts as present.

use crate::progress::ProgressState;
use crate::tree::{DirectoryNode, FileNode, Node};
use dirmirror_types::{DirectoryPair, Error, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of comparing two directory trees
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffTree {
    /// Root node, named after the source root
    pub root: DirectoryNode,
    /// Number of file nodes in the tree
    pub missing_files: u64,
}

impl DiffTree {
    /// Whether the destination already holds every source entry
    pub fn is_empty(&self) -> bool {
        !self.root.has_children()
    }

    /// Number of nodes excluding the root
    pub fn item_count(&self) -> usize {
        self.root.item_count()
    }
}

/// Walks a source and a destination root in lock-step
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeDiffer;

struct DiffContext<'a> {
    missing_files: u64,
    progress: Option<&'a ProgressState>,
}

impl DiffContext<'_> {
    fn count_file(&mut self) {
        self.missing_files += 1;
        if let Some(progress) = self.progress {
            progress.add_missing_file();
        }
    }
}

impl TreeDiffer {
    /// Create a new differ
    pub fn new() -> Self {
        Self
    }

    /// Compare two roots, validating them first
    pub fn compare<S: AsRef<Path>, D: AsRef<Path>>(
        &self,
        source: S,
        destination: D,
    ) -> Result<DiffTree> {
        self.compare_pair(&DirectoryPair::new(source.as_ref(), destination.as_ref()))
    }

    /// Compare the roots of a pair
    pub fn compare_pair(&self, pair: &DirectoryPair) -> Result<DiffTree> {
        self.compare_with_progress(pair, None)
    }

    /// Compare the roots of a pair, counting missing files into `progress` as they are found
    pub fn compare_with_progress(
        &self,
        pair: &DirectoryPair,
        progress: Option<&ProgressState>,
    ) -> Result<DiffTree> {
        pair.validate()?;

        let source = &pair.source_directory;
        let destination = &pair.destination_directory;
        info!(
            "Comparing '{}' against '{}'",
            source.display(),
            destination.display()
        );

        let mut root = DirectoryNode::new(root_name(source));
        let mut context = DiffContext {
            missing_files: 0,
            progress,
        };
        Self::compare_directories(source, destination, &mut root, &mut context);

        info!(
            "Found {} missing files in {} missing items",
            context.missing_files,
            root.item_count()
        );
        Ok(DiffTree {
            root,
            missing_files: context.missing_files,
        })
    }

    fn compare_directories(
        source_dir: &Path,
        dest_dir: &Path,
        parent: &mut DirectoryNode,
        context: &mut DiffContext<'_>,
    ) {
        for (name, source_item) in list_entries(source_dir) {
            let dest_item = dest_dir.join(&name);

            if !dest_item.exists() {
                if source_item.is_dir() {
                    let mut dir = DirectoryNode::new(name);
                    Self::add_all_contents(&source_item, &mut dir, context);
                    parent.add_child(dir);
                } else {
                    context.count_file();
                    parent.add_child(FileNode::new(name));
                }
            } else if source_item.is_dir() && dest_item.is_dir() {
                let mut dir = DirectoryNode::new(name);
                Self::compare_directories(&source_item, &dest_item, &mut dir, context);
                if dir.has_children() {
                    parent.add_child(dir);
                }
            } else if source_item.is_dir() != dest_item.is_dir() {
                debug!(
                    "Type mismatch for '{}', treating it as present",
                    source_item.display()
                );
            }
        }
    }

    fn add_all_contents(dir: &Path, parent: &mut DirectoryNode, context: &mut DiffContext<'_>) {
        for (name, item) in list_entries(dir) {
            let node = if item.is_dir() {
                let mut child = DirectoryNode::new(name);
                Self::add_all_contents(&item, &mut child, context);
                Node::Directory(child)
            } else {
                context.count_file();
                Node::file(name)
            };
            parent.add_child(node);
        }
    }
}

fn root_name(path: &Path) -> OsString {
    path.file_name()
        .unwrap_or_else(|| path.as_os_str())
        .to_os_string()
}

/// Entries of `dir` as (raw name, path); an unreadable directory yields nothing
fn list_entries(dir: &Path) -> Vec<(OsString, PathBuf)> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("{}", Error::enumeration(dir, &e));
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some((entry.file_name(), entry.path())),
            Err(e) => {
                warn!("{}", Error::enumeration(dir, &e));
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirmirror_types::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    fn populate(root: &Path, entries: &[&str]) {
        for entry in entries {
            let path = root.join(entry);
            if entry.ends_with('/') {
                fs::create_dir_all(&path).unwrap();
            } else {
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(&path, entry.as_bytes()).unwrap();
            }
        }
    }

    fn setup(source: &[&str], destination: &[&str]) -> (TempDir, TempDir) {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        populate(src.path(), source);
        populate(dst.path(), destination);
        (src, dst)
    }

    #[test]
    fn test_missing_files_in_existing_subdirectory() {
        let (src, dst) = setup(&["a.txt", "sub/b.txt", "sub/c.txt"], &["a.txt"]);

        let diff = TreeDiffer::new().compare(src.path(), dst.path()).unwrap();

        assert_eq!(diff.missing_files, 2);
        assert_eq!(diff.root.len(), 1);
        let sub = diff.root.child("sub").unwrap().as_directory().unwrap();
        assert_eq!(sub.len(), 2);
        assert!(!sub.child("b.txt").unwrap().is_directory());
        assert!(!sub.child("c.txt").unwrap().is_directory());
    }

    #[test]
    fn test_root_named_after_source() {
        let (src, dst) = setup(&[], &[]);
        let diff = TreeDiffer::new().compare(src.path(), dst.path()).unwrap();
        assert_eq!(diff.root.name, src.path().file_name().unwrap());
    }

    #[test]
    fn test_identical_trees_yield_empty_diff() {
        let layout = ["a.txt", "sub/b.txt", "sub/deeper/c.txt", "empty/"];
        let (src, dst) = setup(&layout, &layout);

        let diff = TreeDiffer::new().compare(src.path(), dst.path()).unwrap();

        assert!(diff.is_empty());
        assert_eq!(diff.missing_files, 0);
    }

    #[test]
    fn test_wholly_missing_empty_directory() {
        let (src, dst) = setup(&["x/"], &[]);

        let diff = TreeDiffer::new().compare(src.path(), dst.path()).unwrap();

        let x = diff.root.child("x").unwrap().as_directory().unwrap();
        assert!(x.is_empty());
        assert_eq!(diff.missing_files, 0);
    }

    #[test]
    fn test_wholly_missing_directory_includes_everything() {
        let (src, dst) = setup(&["new/a.txt", "new/inner/b.txt", "new/inner/empty/"], &[]);

        let diff = TreeDiffer::new().compare(src.path(), dst.path()).unwrap();

        assert_eq!(diff.missing_files, 2);
        assert!(diff.root.get("new/inner/empty").unwrap().is_directory());
        assert_eq!(diff.item_count(), 5);
    }

    #[test]
    fn test_content_difference_is_not_reported() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::write(src.path().join("report.txt"), b"version 2").unwrap();
        fs::write(dst.path().join("report.txt"), b"version 1, longer").unwrap();

        let diff = TreeDiffer::new().compare(src.path(), dst.path()).unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn test_pruning_keeps_only_path_to_difference() {
        let (src, dst) = setup(
            &["a/one.txt", "b/two.txt", "c/deep/nested/three.txt", "c/deep/four.txt"],
            &["a/one.txt", "b/two.txt", "c/deep/four.txt", "c/deep/nested/"],
        );

        let diff = TreeDiffer::new().compare(src.path(), dst.path()).unwrap();

        assert_eq!(diff.root.len(), 1);
        assert!(diff.root.child("a").is_none());
        assert!(diff.root.child("b").is_none());
        assert_eq!(
            diff.root.file_paths(),
            vec![Path::new("c").join("deep").join("nested").join("three.txt")]
        );
        assert_eq!(diff.item_count(), 4);
    }

    #[test]
    fn test_type_mismatch_is_treated_as_present() {
        let (src, dst) = setup(&["clash/inside.txt", "other.txt"], &["clash", "other.txt/"]);

        let diff = TreeDiffer::new().compare(src.path(), dst.path()).unwrap();

        assert!(diff.is_empty());
        assert_eq!(diff.missing_files, 0);
    }

    #[test]
    fn test_progress_total_accumulates() {
        let (src, dst) = setup(&["a.txt", "b/c.txt", "b/d.txt"], &[]);
        let progress = ProgressState::new();

        let pair = DirectoryPair::new(src.path(), dst.path());
        let diff = TreeDiffer::new()
            .compare_with_progress(&pair, Some(&progress))
            .unwrap();

        assert_eq!(diff.missing_files, 3);
        assert_eq!(progress.total_file_count(), 3);
    }

    #[test]
    fn test_invalid_roots_fail_validation() {
        let (src, _dst) = setup(&[], &[]);
        let error = TreeDiffer::new()
            .compare(src.path(), src.path().join("nope"))
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_unreadable_directory_counts_as_empty() {
        assert!(list_entries(Path::new("/definitely/not/a/real/dir")).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unlistable_subdirectory_keeps_siblings() {
        use std::os::unix::fs::PermissionsExt;

        let (src, dst) = setup(&["a.txt", "locked/inner.txt", "z/last.txt"], &["z/"]);
        let locked = src.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // Privileged users bypass permission bits.
        let still_listable = fs::read_dir(&locked).is_ok();

        let result = TreeDiffer::new().compare(src.path(), dst.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        let diff = result.unwrap();

        assert!(diff.root.child("a.txt").is_some());
        assert!(diff.root.get("z/last.txt").is_some());
        let locked_node = diff.root.child("locked").and_then(Node::as_directory).unwrap();
        if still_listable {
            assert_eq!(locked_node.len(), 1);
            assert_eq!(diff.missing_files, 3);
        } else {
            assert!(locked_node.is_empty());
            assert_eq!(diff.missing_files, 2);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_are_compared_raw() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let shared = OsStr::from_bytes(b"caf\xe9.txt");
        let first = OsStr::from_bytes(b"a\xe9");
        let second = OsStr::from_bytes(b"a\xe8");
        let (src, dst) = setup(&[], &[]);
        for name in [shared, first, second] {
            fs::write(src.path().join(name), b"x").unwrap();
        }
        fs::write(dst.path().join(shared), b"x").unwrap();

        let diff = TreeDiffer::new().compare(src.path(), dst.path()).unwrap();

        assert!(diff.root.child(shared).is_none());
        assert!(diff.root.child(first).is_some());
        assert!(diff.root.child(second).is_some());
        assert_eq!(diff.item_count(), 2);
        assert_eq!(diff.missing_files, 2);
    }
}
