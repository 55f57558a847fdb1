//! Core data types for DirMirror
//!
//! This module provides the directory pair that every comparison starts from and the
//! statistics returned by a replication run.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Error, Result};

/// Source and destination roots of a mirror operation
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DirectoryPair {
    /// Directory whose entries should exist in the destination
    pub source_directory: PathBuf,
    /// Directory that receives the missing entries
    pub destination_directory: PathBuf,
}

impl DirectoryPair {
    /// Create a new pair without touching the filesystem
    pub fn new<S: Into<PathBuf>, D: Into<PathBuf>>(source: S, destination: D) -> Self {
        Self {
            source_directory: source.into(),
            destination_directory: destination.into(),
        }
    }

    /// Check that both roots exist and are directories
    pub fn validate(&self) -> Result<()> {
        validate_directory(&self.source_directory, "source")?;
        validate_directory(&self.destination_directory, "destination")
    }

    /// Boolean form of [`DirectoryPair::validate`]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

fn validate_directory(path: &Path, role: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::validation(path, format!("{} path is empty", role)));
    }
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(Error::validation(
            path,
            format!("{} path is not a directory", role),
        )),
        Err(e) => Err(Error::validation(
            path,
            format!("{} path is not accessible: {}", role, e),
        )),
    }
}

/// Built-in file transfer strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TransferMode {
    /// Copy files, overwriting an existing destination file
    #[default]
    Copy,
    /// Move files, removing them from the source
    Move,
}

impl std::fmt::Display for TransferMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Copy => write!(f, "copy"),
            Self::Move => write!(f, "move"),
        }
    }
}

/// Statistics of a single replication run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReplicationStats {
    /// Files handed to the file operation successfully
    pub files_processed: u64,
    /// Directories created in the destination for directory nodes
    pub directories_created: u64,
    /// Subtrees skipped because a destination directory could not be created
    pub skipped: Vec<PathBuf>,
    /// Wall-clock duration of the run
    pub duration: Duration,
}

impl ReplicationStats {
    /// Create a new empty statistics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether every node of the diff tree was handled
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Files per second over the whole run
    pub fn files_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.files_processed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }
}
