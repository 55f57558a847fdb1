//! Integration tests for DirMirror
//!
//! These tests drive comparison and replication end to end against real
//! temporary directory trees.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dirmirror_sync::{DirectoryComparator, Node, ReplicationPhase, NOT_STARTED};
use dirmirror_tests::test_utils::{file_snapshot, populate, snapshot, write_file, Fixture};
use dirmirror_types::{Error, ErrorKind, FileOperation, Result, TransferMode};
use proptest::prelude::*;
use rstest::rstest;

/// Copies like the default operation, but slowly enough to be observed
#[derive(Debug)]
struct SlowCopy {
    delay: Duration,
}

impl FileOperation for SlowCopy {
    fn execute(&self, source: &Path, destination: &Path) -> Result<()> {
        std::thread::sleep(self.delay);
        fs::copy(source, destination).map(|_| ()).map_err(Error::from)
    }

    fn name(&self) -> &str {
        "SlowCopy"
    }
}

fn names(paths: Vec<PathBuf>) -> Vec<String> {
    paths
        .iter()
        .map(|path| path.to_string_lossy().replace('\\', "/"))
        .collect()
}

#[test]
fn test_missing_files_in_subdirectory() {
    let fixture = Fixture::new(&["a.txt", "sub/b.txt", "sub/c.txt"], &["a.txt"]);
    let mut comparator = DirectoryComparator::new();

    let diff = comparator
        .compare(fixture.source_path(), fixture.destination_path())
        .unwrap();

    assert_eq!(diff.root.len(), 1);
    let sub = diff.root.child("sub").and_then(Node::as_directory).unwrap();
    assert_eq!(names(sub.file_paths()), vec!["b.txt", "c.txt"]);
    assert_eq!(comparator.total_file_count(), 2);
    assert_eq!(comparator.processed_file_count(), NOT_STARTED);

    let stats = comparator.replicate().unwrap();

    assert_eq!(stats.files_processed, 2);
    assert_eq!(stats.directories_created, 1);
    assert_eq!(comparator.processed_file_count(), 2);
    assert_eq!(
        file_snapshot(fixture.destination_path()),
        file_snapshot(fixture.source_path())
    );
}

#[test]
fn test_empty_directory_is_replicated() {
    let fixture = Fixture::new(&["x/"], &[]);
    let mut comparator = DirectoryComparator::new();

    let diff = comparator
        .compare(fixture.source_path(), fixture.destination_path())
        .unwrap();

    let x = diff.root.child("x").and_then(Node::as_directory).unwrap();
    assert!(x.is_empty());
    assert_eq!(diff.missing_files, 0);
    assert_eq!(comparator.total_file_count(), 0);

    let stats = comparator.replicate().unwrap();

    assert_eq!(stats.files_processed, 0);
    assert!(fixture.destination_path().join("x").is_dir());
    assert_eq!(comparator.processed_file_count(), 0);
}

#[test]
fn test_content_differences_are_ignored() {
    let fixture = Fixture::new(&[], &[]);
    write_file(fixture.source_path(), "report.txt", b"version 2");
    write_file(fixture.destination_path(), "report.txt", b"version 1");

    let mut comparator = DirectoryComparator::new();
    let diff = comparator
        .compare(fixture.source_path(), fixture.destination_path())
        .unwrap();

    assert!(diff.is_empty());
    comparator.replicate().unwrap();
    assert_eq!(
        fs::read(fixture.destination_path().join("report.txt")).unwrap(),
        b"version 1"
    );
}

#[test]
fn test_directories_without_missing_content_are_pruned() {
    let fixture = Fixture::new(
        &["keep/same.txt", "keep/deep/also.txt", "new/n.txt"],
        &["keep/same.txt", "keep/deep/also.txt"],
    );
    let mut comparator = DirectoryComparator::new();

    let diff = comparator
        .compare(fixture.source_path(), fixture.destination_path())
        .unwrap();

    assert_eq!(names(diff.root.paths()), vec!["new", "new/n.txt"]);
}

#[test]
fn test_type_mismatch_counts_as_present() {
    let fixture = Fixture::new(&["clash", "other/"], &["clash/", "other"]);
    let mut comparator = DirectoryComparator::new();

    let diff = comparator
        .compare(fixture.source_path(), fixture.destination_path())
        .unwrap();

    assert!(diff.is_empty());
    assert_eq!(comparator.total_file_count(), 0);
}

#[test]
fn test_replication_is_idempotent() {
    let fixture = Fixture::new(&["a.txt", "sub/b.txt", "sub/deeper/c.txt", "empty/"], &[]);
    let mut comparator = DirectoryComparator::new();

    comparator
        .compare(fixture.source_path(), fixture.destination_path())
        .unwrap();
    comparator.replicate().unwrap();
    let after_first = snapshot(fixture.destination_path());

    let diff = comparator
        .compare(fixture.source_path(), fixture.destination_path())
        .unwrap();
    assert!(diff.is_empty());

    let stats = comparator.replicate().unwrap();
    assert_eq!(stats.files_processed, 0);
    assert_eq!(snapshot(fixture.destination_path()), after_first);
    assert_eq!(after_first, snapshot(fixture.source_path()));
}

#[test]
fn test_existing_destination_files_are_untouched() {
    let fixture = Fixture::new(&["a.txt", "b.txt"], &[]);
    write_file(fixture.destination_path(), "a.txt", b"local edit");
    write_file(fixture.destination_path(), "only-here.txt", b"mine");

    let mut comparator = DirectoryComparator::new();
    comparator
        .compare(fixture.source_path(), fixture.destination_path())
        .unwrap();
    comparator.replicate().unwrap();

    let dst = fixture.destination_path();
    assert_eq!(fs::read(dst.join("a.txt")).unwrap(), b"local edit");
    assert_eq!(fs::read(dst.join("only-here.txt")).unwrap(), b"mine");
    assert!(dst.join("b.txt").is_file());
}

#[rstest]
#[case(TransferMode::Copy, true)]
#[case(TransferMode::Move, false)]
fn test_transfer_modes(#[case] mode: TransferMode, #[case] source_kept: bool) {
    let fixture = Fixture::new(&["sub/b.txt"], &[]);
    let mut comparator = DirectoryComparator::with_mode(mode);

    comparator
        .compare(fixture.source_path(), fixture.destination_path())
        .unwrap();
    comparator.replicate().unwrap();

    assert!(fixture.destination_path().join("sub/b.txt").is_file());
    assert_eq!(
        fixture.source_path().join("sub/b.txt").exists(),
        source_kept
    );
}

#[rstest]
#[case(true, false)]
#[case(false, true)]
fn test_invalid_roots_are_rejected(#[case] break_source: bool, #[case] break_destination: bool) {
    let fixture = Fixture::new(&["a.txt"], &[]);
    let missing = fixture.source_path().join("does-not-exist");
    let source = if break_source {
        missing.clone()
    } else {
        fixture.source_path().to_path_buf()
    };
    let destination = if break_destination {
        missing
    } else {
        fixture.destination_path().to_path_buf()
    };

    assert!(!DirectoryComparator::validate_paths(&source, &destination));
    let error = DirectoryComparator::new()
        .compare(&source, &destination)
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Validation);
}

#[test]
fn test_file_root_is_rejected() {
    let fixture = Fixture::new(&["a.txt"], &[]);
    let file_root = fixture.source_path().join("a.txt");

    assert!(!DirectoryComparator::validate_paths(
        &file_root,
        fixture.destination_path()
    ));
}

#[test]
fn test_failed_directory_creation_skips_subtree() {
    let fixture = Fixture::new(&["blocked/inner.txt", "fine/ok.txt"], &[]);
    let mut comparator = DirectoryComparator::new();
    comparator
        .compare(fixture.source_path(), fixture.destination_path())
        .unwrap();

    // A file now occupies the directory's name in the destination.
    write_file(fixture.destination_path(), "blocked", b"in the way");

    let stats = comparator.replicate().unwrap();

    assert_eq!(stats.skipped, vec![PathBuf::from("blocked")]);
    assert_eq!(stats.files_processed, 1);
    assert!(fixture.destination_path().join("fine/ok.txt").is_file());
    assert!(fixture.destination_path().join("blocked").is_file());
}

#[test]
fn test_vanished_source_file_aborts_replication() {
    let fixture = Fixture::new(&["a.txt", "b.txt"], &[]);
    let mut comparator = DirectoryComparator::new();
    comparator
        .compare(fixture.source_path(), fixture.destination_path())
        .unwrap();

    fs::remove_file(fixture.source_path().join("a.txt")).unwrap();

    let error = comparator.replicate().unwrap_err();
    assert_eq!(error.kind(), ErrorKind::FileTransfer);
    assert_eq!(
        comparator.progress_snapshot().phase,
        ReplicationPhase::Failed
    );
    assert!(!fixture.destination_path().join("b.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_non_utf8_names_replicate_unchanged() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let shared = OsStr::from_bytes(b"caf\xe9.txt");
    let first = OsStr::from_bytes(b"a\xe9");
    let second = OsStr::from_bytes(b"a\xe8");
    let fixture = Fixture::new(&["sub/"], &[]);
    fs::write(fixture.source_path().join(shared), b"shared").unwrap();
    fs::write(fixture.destination_path().join(shared), b"kept").unwrap();
    fs::write(fixture.source_path().join("sub").join(first), b"first").unwrap();
    fs::write(fixture.source_path().join("sub").join(second), b"second").unwrap();

    let mut comparator = DirectoryComparator::new();
    let diff = comparator
        .compare(fixture.source_path(), fixture.destination_path())
        .unwrap();
    assert_eq!(diff.missing_files, 2);
    assert_eq!(diff.item_count(), 3);

    let stats = comparator.replicate().unwrap();

    assert_eq!(stats.files_processed, 2);
    assert_eq!(
        comparator.processed_file_count(),
        comparator.total_file_count() as i64
    );
    let sub = fixture.destination_path().join("sub");
    assert_eq!(fs::read(sub.join(first)).unwrap(), b"first");
    assert_eq!(fs::read(sub.join(second)).unwrap(), b"second");
    assert_eq!(
        fs::read(fixture.destination_path().join(shared)).unwrap(),
        b"kept"
    );
    assert!(comparator
        .compare(fixture.source_path(), fixture.destination_path())
        .unwrap()
        .is_empty());
}

#[test]
fn test_operation_errors_are_wrapped_once() {
    let fixture = Fixture::new(&["a.txt"], &[]);
    let mut comparator = DirectoryComparator::with_operation(Arc::new(SlowCopy {
        delay: Duration::ZERO,
    }));
    comparator
        .compare(fixture.source_path(), fixture.destination_path())
        .unwrap();
    fs::remove_file(fixture.source_path().join("a.txt")).unwrap();

    let message = comparator.replicate().unwrap_err().to_string();

    assert!(message.starts_with("Failed to slowcopy file 'a.txt':"));
    assert_eq!(message.matches("Failed to").count(), 1);
}

#[tokio::test]
async fn test_progress_is_observable_while_replicating() {
    let entries: Vec<String> = (0..8).map(|i| format!("dir/file{}.txt", i)).collect();
    let entry_refs: Vec<&str> = entries.iter().map(String::as_str).collect();
    let fixture = Fixture::new(&entry_refs, &[]);

    let mut comparator = DirectoryComparator::with_operation(Arc::new(SlowCopy {
        delay: Duration::from_millis(15),
    }));
    comparator
        .compare(fixture.source_path(), fixture.destination_path())
        .unwrap();
    assert_eq!(comparator.total_file_count(), 8);

    let progress = comparator.progress();
    let done = Arc::new(AtomicBool::new(false));
    let worker_done = Arc::clone(&done);

    let worker = tokio::task::spawn_blocking(move || {
        let result = comparator.replicate();
        worker_done.store(true, Ordering::Release);
        result
    });

    let mut observed = Vec::new();
    while !done.load(Ordering::Acquire) {
        observed.push(progress.processed_file_count());
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let stats = worker.await.unwrap().unwrap();
    assert_eq!(stats.files_processed, 8);
    assert_eq!(progress.processed_file_count(), 8);
    assert!(progress.currently_copying_file_name().starts_with("dir"));

    assert!(observed.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(observed
        .iter()
        .all(|&count| (NOT_STARTED..=8).contains(&count)));
}

#[test]
fn test_total_is_reset_per_comparison() {
    let fixture = Fixture::new(&["a.txt", "b.txt"], &[]);
    let mut comparator = DirectoryComparator::new();

    comparator
        .compare(fixture.source_path(), fixture.destination_path())
        .unwrap();
    assert_eq!(comparator.total_file_count(), 2);

    populate(fixture.destination_path(), &["a.txt"]);
    comparator
        .compare(fixture.source_path(), fixture.destination_path())
        .unwrap();
    assert_eq!(comparator.total_file_count(), 1);
}

fn file_layout() -> impl Strategy<Value = (BTreeSet<String>, BTreeSet<String>)> {
    let file = (0..3usize, 0..4usize).prop_map(|(dir, file)| match dir {
        0 => format!("f{}.txt", file),
        1 => format!("d1/f{}.txt", file),
        _ => format!("d1/d2/f{}.txt", file),
    });
    prop::collection::btree_set(file, 0..12).prop_flat_map(|source| {
        let all: Vec<String> = source.iter().cloned().collect();
        let len = all.len();
        (
            Just(source),
            prop::sample::subsequence(all, 0..=len)
                .prop_map(|kept| kept.into_iter().collect::<BTreeSet<_>>()),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_diff_lists_exactly_the_missing_files((source, destination) in file_layout()) {
        let source_refs: Vec<&str> = source.iter().map(String::as_str).collect();
        let destination_refs: Vec<&str> = destination.iter().map(String::as_str).collect();
        let fixture = Fixture::new(&source_refs, &destination_refs);

        let mut comparator = DirectoryComparator::new();
        let diff = comparator
            .compare(fixture.source_path(), fixture.destination_path())
            .unwrap();

        let expected: Vec<String> = source.difference(&destination).cloned().collect();
        let mut actual = names(diff.root.file_paths());
        actual.sort();
        prop_assert_eq!(&actual, &expected);
        prop_assert_eq!(diff.missing_files, expected.len() as u64);
        prop_assert_eq!(comparator.total_file_count(), expected.len() as u64);
    }

    #[test]
    fn prop_replicate_then_compare_is_empty((source, destination) in file_layout()) {
        let source_refs: Vec<&str> = source.iter().map(String::as_str).collect();
        let destination_refs: Vec<&str> = destination.iter().map(String::as_str).collect();
        let fixture = Fixture::new(&source_refs, &destination_refs);

        let mut comparator = DirectoryComparator::new();
        comparator
            .compare(fixture.source_path(), fixture.destination_path())
            .unwrap();
        let stats = comparator.replicate().unwrap();

        prop_assert!(stats.is_complete());
        prop_assert_eq!(
            file_snapshot(fixture.destination_path()),
            file_snapshot(fixture.source_path())
        );
        let diff = comparator
            .compare(fixture.source_path(), fixture.destination_path())
            .unwrap();
        prop_assert!(diff.is_empty());
    }
}
