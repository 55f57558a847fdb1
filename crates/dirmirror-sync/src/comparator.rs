//! Service façade used by presentation layers
//!
//! A [`DirectoryComparator`] remembers the last directory pair and the last diff
//! tree so that a shell can compare, show the result, and then replicate it. The
//! progress counters live behind an [`Arc`] so an observer thread can poll them
//! while the comparator is busy on a worker thread.

use crate::diff::{DiffTree, TreeDiffer};
use crate::operation::{for_mode, CopyFileOperation};
use crate::progress::{ProgressSnapshot, ProgressState};
use crate::replicate::Replicator;
use crate::tree::DirectoryNode;
use dirmirror_types::{
    DirectoryPair, Error, FileOperation, ReplicationStats, Result, TransferMode,
};
use std::path::Path;
use std::sync::Arc;

/// Compares directory pairs and replicates the differences
#[derive(Debug)]
pub struct DirectoryComparator {
    pair: Option<DirectoryPair>,
    comparison: Option<DiffTree>,
    operation: Arc<dyn FileOperation>,
    progress: Arc<ProgressState>,
    differ: TreeDiffer,
}

impl Default for DirectoryComparator {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryComparator {
    /// Create a comparator that copies missing files
    pub fn new() -> Self {
        Self::with_operation(Arc::new(CopyFileOperation))
    }

    /// Create a comparator with a custom file operation
    pub fn with_operation(operation: Arc<dyn FileOperation>) -> Self {
        Self {
            pair: None,
            comparison: None,
            operation,
            progress: Arc::new(ProgressState::new()),
            differ: TreeDiffer::new(),
        }
    }

    /// Create a comparator for a built-in transfer mode
    pub fn with_mode(mode: TransferMode) -> Self {
        Self::with_operation(for_mode(mode))
    }

    /// Replace the file operation used by later replications
    pub fn set_operation(&mut self, operation: Arc<dyn FileOperation>) {
        self.operation = operation;
    }

    /// File operation used by [`DirectoryComparator::replicate`]
    pub fn operation(&self) -> &dyn FileOperation {
        self.operation.as_ref()
    }

    /// Set the pair used by [`DirectoryComparator::compare_current`]
    pub fn set_directory_pair(&mut self, pair: DirectoryPair) {
        self.pair = Some(pair);
    }

    /// Pair of the last comparison
    pub fn directory_pair(&self) -> Option<&DirectoryPair> {
        self.pair.as_ref()
    }

    /// True iff both roots exist and are directories
    pub fn validate(pair: &DirectoryPair) -> bool {
        pair.is_valid()
    }

    /// Path form of [`DirectoryComparator::validate`]
    pub fn validate_paths<S: AsRef<Path>, D: AsRef<Path>>(source: S, destination: D) -> bool {
        Self::validate(&DirectoryPair::new(source.as_ref(), destination.as_ref()))
    }

    /// Compare two roots and remember them for replication
    pub fn compare<S: AsRef<Path>, D: AsRef<Path>>(
        &mut self,
        source: S,
        destination: D,
    ) -> Result<DiffTree> {
        self.compare_pair(DirectoryPair::new(source.as_ref(), destination.as_ref()))
    }

    /// Compare the roots of `pair` and remember it for replication.
    ///
    /// An invalid pair is rejected before it replaces the current one.
    pub fn compare_pair(&mut self, pair: DirectoryPair) -> Result<DiffTree> {
        pair.validate()?;
        self.pair = Some(pair);
        self.compare_current()
    }

    /// Compare the pair set earlier
    pub fn compare_current(&mut self) -> Result<DiffTree> {
        let pair = self.pair.as_ref().ok_or_else(|| {
            Error::state("No directory pair has been set. Call set_directory_pair() first.")
        })?;
        pair.validate()?;

        self.comparison = None;
        self.progress.reset_total();
        let diff = self
            .differ
            .compare_with_progress(pair, Some(self.progress.as_ref()))?;
        self.comparison = Some(diff.clone());
        Ok(diff)
    }

    /// Result of the last successful comparison
    pub fn last_comparison(&self) -> Option<&DiffTree> {
        self.comparison.as_ref()
    }

    /// Replicate the last comparison with the configured operation
    pub fn replicate(&self) -> Result<ReplicationStats> {
        let diff = self.comparison.as_ref().ok_or_else(|| {
            Error::state("No comparison has been performed yet. Call compare() first.")
        })?;
        self.replicate_tree(&diff.root)
    }

    /// Replicate a tree computed against the current pair
    pub fn replicate_tree(&self, tree: &DirectoryNode) -> Result<ReplicationStats> {
        self.replicate_with(tree, Arc::clone(&self.operation))
    }

    /// Replicate the last comparison by copying, whatever operation is configured
    pub fn copy_missing_items(&self) -> Result<ReplicationStats> {
        let diff = self.comparison.as_ref().ok_or_else(|| {
            Error::state("No comparison has been performed yet. Call compare() first.")
        })?;
        self.replicate_with(&diff.root, Arc::new(CopyFileOperation))
    }

    fn replicate_with(
        &self,
        tree: &DirectoryNode,
        operation: Arc<dyn FileOperation>,
    ) -> Result<ReplicationStats> {
        let pair = self.pair.as_ref().ok_or_else(|| {
            Error::state("No directory pair has been set. Call set_directory_pair() first.")
        })?;
        Replicator::new(operation, Arc::clone(&self.progress)).replicate(
            tree,
            &pair.source_directory,
            &pair.destination_directory,
        )
    }

    /// Handle to the progress counters for observers on other threads
    pub fn progress(&self) -> Arc<ProgressState> {
        Arc::clone(&self.progress)
    }

    /// Files found missing by the last comparison
    pub fn total_file_count(&self) -> u64 {
        self.progress.total_file_count()
    }

    /// Files processed by the current replication, -1 before the first one
    pub fn processed_file_count(&self) -> i64 {
        self.progress.processed_file_count()
    }

    /// Relative path of the last processed file
    pub fn currently_copying_file_name(&self) -> String {
        self.progress.currently_copying_file_name()
    }

    /// All progress counters at once
    pub fn progress_snapshot(&self) -> ProgressSnapshot {
        self.progress.snapshot()
    }
}
