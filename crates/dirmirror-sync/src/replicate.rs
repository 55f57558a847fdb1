//! Replication of a diff tree into the destination root
//!
//! The replicator follows the relative paths recorded in a [`DirectoryNode`]; it
//! never re-reads the source tree to find more work.

use crate::progress::{ProgressState, ReplicationPhase};
use crate::tree::{DirectoryNode, Node};
use dirmirror_types::{Error, FileOperation, ReplicationStats, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Applies a file operation to every node of a diff tree
#[derive(Debug, Clone)]
pub struct Replicator {
    operation: Arc<dyn FileOperation>,
    progress: Arc<ProgressState>,
}

struct Roots<'a> {
    source: &'a Path,
    destination: &'a Path,
}

impl Roots<'_> {
    fn resolve(&self, relative: &Path) -> (PathBuf, PathBuf) {
        if relative.as_os_str().is_empty() {
            (self.source.to_path_buf(), self.destination.to_path_buf())
        } else {
            (self.source.join(relative), self.destination.join(relative))
        }
    }
}

impl Replicator {
    /// Create a replicator reporting into `progress`
    pub fn new(operation: Arc<dyn FileOperation>, progress: Arc<ProgressState>) -> Self {
        Self {
            operation,
            progress,
        }
    }

    /// Replicate `tree`, whose root corresponds to `source_root`, into `destination_root`.
    ///
    /// Stops at the first file that cannot be transferred. Subtrees whose destination
    /// directory cannot be created are skipped and listed in the returned statistics.
    pub fn replicate(
        &self,
        tree: &DirectoryNode,
        source_root: &Path,
        destination_root: &Path,
    ) -> Result<ReplicationStats> {
        let start = Instant::now();
        let roots = Roots {
            source: source_root,
            destination: destination_root,
        };
        let mut stats = ReplicationStats::new();

        info!(
            "{} of {} missing files from '{}' to '{}' started",
            self.operation.name(),
            tree.file_count(),
            source_root.display(),
            destination_root.display()
        );
        self.progress.begin_run();

        let result = self.process_directory(tree, Path::new(""), &roots, &mut stats);
        stats.duration = start.elapsed();

        match result {
            Ok(()) => {
                self.progress.finish(ReplicationPhase::Completed);
                info!(
                    "{} completed: {} files, {} directories created, {} skipped in {:?}",
                    self.operation.name(),
                    stats.files_processed,
                    stats.directories_created,
                    stats.skipped.len(),
                    stats.duration
                );
                Ok(stats)
            }
            Err(e) => {
                self.progress.finish(ReplicationPhase::Failed);
                Err(e)
            }
        }
    }

    fn process_node(
        &self,
        node: &Node,
        relative: &Path,
        roots: &Roots<'_>,
        stats: &mut ReplicationStats,
    ) -> Result<()> {
        match node {
            Node::Directory(dir) => self.process_directory(dir, relative, roots, stats),
            Node::File(_) => self.process_file(relative, roots, stats),
        }
    }

    fn process_directory(
        &self,
        dir: &DirectoryNode,
        relative: &Path,
        roots: &Roots<'_>,
        stats: &mut ReplicationStats,
    ) -> Result<()> {
        let (_, destination) = roots.resolve(relative);
        if !ensure_parent_exists(&destination, relative, stats) {
            return Ok(());
        }

        match fs::create_dir(&destination) {
            Ok(()) => {
                stats.directories_created += 1;
                debug!("Directory created: {}", relative.display());
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists && destination.is_dir() => {
                debug!("Directory already exists: {}", relative.display());
            }
            Err(e) => {
                warn!("{}", Error::directory_creation(&destination, &e));
                stats.skipped.push(relative.to_path_buf());
                return Ok(());
            }
        }

        for child in dir.children().values() {
            self.process_node(child, &relative.join(child.name()), roots, stats)?;
        }
        Ok(())
    }

    fn process_file(
        &self,
        relative: &Path,
        roots: &Roots<'_>,
        stats: &mut ReplicationStats,
    ) -> Result<()> {
        let (source, destination) = roots.resolve(relative);
        if !ensure_parent_exists(&destination, relative, stats) {
            return Ok(());
        }

        match self.operation.execute(&source, &destination) {
            Ok(()) => {
                debug!("{} file: {}", self.operation.name(), relative.display());
                self.progress.record_file(relative.display().to_string());
                stats.files_processed += 1;
                Ok(())
            }
            Err(e) => {
                let error = Error::file_transfer(relative, self.operation.name(), &e);
                error!("{}", error);
                Err(error)
            }
        }
    }
}

/// Create missing ancestors of `destination`; false means the node must be skipped
fn ensure_parent_exists(destination: &Path, relative: &Path, stats: &mut ReplicationStats) -> bool {
    let Some(parent) = destination.parent() else {
        return true;
    };
    if parent.as_os_str().is_empty() || parent.is_dir() {
        return true;
    }
    match fs::create_dir_all(parent) {
        Ok(()) => true,
        Err(e) => {
            warn!("{}", Error::directory_creation(parent, &e));
            stats.skipped.push(relative.to_path_buf());
            false
        }
    }
}
