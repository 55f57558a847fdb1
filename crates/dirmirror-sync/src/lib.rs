//! Tree difference detection and replication for DirMirror
//!
//! This crate finds the files and directories present under a source root but absent
//! under a destination root, and copies them over while publishing progress:
//!
//! - **Node Model** ([`tree`]): the diff tree of missing files and directories
//! - **Tree Differencer** ([`diff`]): lock-step walk that builds the pruned diff tree
//! - **Replication Engine** ([`replicate`]): ordered replication with parent creation
//! - **Progress Tracking** ([`progress`]): atomic counters an observer can poll
//! - **Service** ([`comparator`]): the façade shells talk to
//!
//! # Examples
//!
//! ```rust,no_run
//! use dirmirror_sync::DirectoryComparator;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut comparator = DirectoryComparator::new();
//! let diff = comparator.compare("source_dir", "dest_dir")?;
//! println!("{}", diff.root);
//!
//! let stats = comparator.replicate()?;
//! println!("Copied {} of {} files", stats.files_processed, comparator.total_file_count());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod comparator;
pub mod diff;
pub mod operation;
pub mod progress;
pub mod replicate;
pub mod tree;

pub use comparator::DirectoryComparator;
pub use diff::{DiffTree, TreeDiffer};
pub use operation::{for_mode, CopyFileOperation, MoveFileOperation};
pub use progress::{ProgressSnapshot, ProgressState, ReplicationPhase, NOT_STARTED};
pub use replicate::Replicator;
pub use tree::{DirectoryNode, FileNode, Node};
