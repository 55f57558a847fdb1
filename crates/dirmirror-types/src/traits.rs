//! Core traits for DirMirror operations
//!
//! The replication engine never touches file contents itself; it hands every
//! missing file to a [`FileOperation`] so copy and move share the same traversal.

use crate::Result;
use std::path::Path;

/// Strategy applied to each missing file during replication
pub trait FileOperation: Send + Sync + std::fmt::Debug {
    /// Perform the operation from `source` to `destination`.
    ///
    /// The parent directory of `destination` already exists when this is called.
    /// An existing file at `destination` may be overwritten.
    fn execute(&self, source: &Path, destination: &Path) -> Result<()>;

    /// Human readable operation name used in log lines, e.g. "Copy"
    fn name(&self) -> &str;
}
