//! Progress counters shared between a replication worker and its observers
//!
//! Each counter is updated on its own, so an observer polling while a file
//! completes may see the new count next to the previous file name.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, AtomicU64, AtomicU8, Ordering};
use std::sync::RwLock;
use tracing::debug;

/// Value of the processed counter before any replication ran
pub const NOT_STARTED: i64 = -1;

/// Lifecycle of a replication run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplicationPhase {
    /// No run has started yet
    NotStarted,
    /// A run is copying files
    Running,
    /// The last run handled the whole tree
    Completed,
    /// The last run stopped on a file transfer failure
    Failed,
}

impl ReplicationPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Completed,
            3 => Self::Failed,
            _ => Self::NotStarted,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::NotStarted => 0,
            Self::Running => 1,
            Self::Completed => 2,
            Self::Failed => 3,
        }
    }

    /// Whether the run reached a final state
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Point-in-time copy of the progress counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Files found missing by the last comparison
    pub total_files: u64,
    /// Files processed by the current run, [`NOT_STARTED`] before the first run
    pub processed_files: i64,
    /// Relative path of the last processed file
    pub current_file: String,
    /// Phase of the current run
    pub phase: ReplicationPhase,
}

impl ProgressSnapshot {
    /// Completion percentage, 0 when nothing is known yet
    pub fn percent(&self) -> f64 {
        if self.total_files == 0 || self.processed_files <= 0 {
            return 0.0;
        }
        (self.processed_files as f64 / self.total_files as f64 * 100.0).min(100.0)
    }
}

/// Live progress of one comparator
#[derive(Debug)]
pub struct ProgressState {
    total_files: AtomicU64,
    processed_files: AtomicI64,
    phase: AtomicU8,
    current_file: RwLock<String>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressState {
    /// Create counters in the "never run" state
    pub fn new() -> Self {
        Self {
            total_files: AtomicU64::new(0),
            processed_files: AtomicI64::new(NOT_STARTED),
            phase: AtomicU8::new(ReplicationPhase::NotStarted.as_u8()),
            current_file: RwLock::new(String::new()),
        }
    }

    /// Files found missing by the last comparison
    pub fn total_file_count(&self) -> u64 {
        self.total_files.load(Ordering::Acquire)
    }

    /// Files processed by the current run, [`NOT_STARTED`] before the first run
    pub fn processed_file_count(&self) -> i64 {
        self.processed_files.load(Ordering::Acquire)
    }

    /// Relative path of the last processed file
    pub fn currently_copying_file_name(&self) -> String {
        match self.current_file.read() {
            Ok(name) => name.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Phase of the current run
    pub fn phase(&self) -> ReplicationPhase {
        ReplicationPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Copy all counters
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total_files: self.total_file_count(),
            processed_files: self.processed_file_count(),
            current_file: self.currently_copying_file_name(),
            phase: self.phase(),
        }
    }

    pub(crate) fn reset_total(&self) {
        self.total_files.store(0, Ordering::Release);
    }

    pub(crate) fn add_missing_file(&self) {
        self.total_files.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn begin_run(&self) {
        self.set_current_file(String::new());
        self.processed_files.store(0, Ordering::Release);
        self.set_phase(ReplicationPhase::Running);
    }

    pub(crate) fn record_file(&self, name: String) {
        self.set_current_file(name);
        self.processed_files.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn finish(&self, phase: ReplicationPhase) {
        self.set_phase(phase);
    }

    fn set_phase(&self, phase: ReplicationPhase) {
        self.phase.store(phase.as_u8(), Ordering::Release);
        debug!("Replication phase changed to: {:?}", phase);
    }

    fn set_current_file(&self, name: String) {
        match self.current_file.write() {
            Ok(mut current) => *current = name,
            Err(poisoned) => *poisoned.into_inner() = name,
        }
    }
}
