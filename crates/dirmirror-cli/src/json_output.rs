//! JSON output structures for the DirMirror CLI

use dirmirror_sync::{DiffTree, DirectoryNode};
use dirmirror_types::DirectoryPair;
use serde::{Deserialize, Serialize};

/// Complete JSON output for a comparison
#[derive(Debug, Serialize, Deserialize)]
pub struct ComparisonJson {
    /// Operation metadata
    pub metadata: OperationMetadata,
    /// Files missing from the destination
    pub missing_files: u64,
    /// Files and directories missing from the destination
    pub missing_items: usize,
    /// True when nothing is missing
    pub in_sync: bool,
    /// Relative paths of every missing file
    pub files: Vec<String>,
    /// The diff tree itself
    pub tree: DirectoryNode,
}

/// Operation metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct OperationMetadata {
    /// DirMirror version
    pub version: String,
    /// Operation type
    pub operation: String,
    /// Source path
    pub source_path: String,
    /// Destination path
    pub destination_path: String,
}

impl ComparisonJson {
    /// Build the JSON report for a finished comparison
    pub fn new(pair: &DirectoryPair, diff: &DiffTree) -> Self {
        Self {
            metadata: OperationMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                operation: "compare".to_string(),
                source_path: pair.source_directory.display().to_string(),
                destination_path: pair.destination_directory.display().to_string(),
            },
            missing_files: diff.missing_files,
            missing_items: diff.item_count(),
            in_sync: diff.is_empty(),
            files: diff
                .root
                .file_paths()
                .iter()
                .map(|path| path.to_string_lossy().replace('\\', "/"))
                .collect(),
            tree: diff.root.clone(),
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
