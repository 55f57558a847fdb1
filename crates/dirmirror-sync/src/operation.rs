//! File transfer strategies applied to missing files

use dirmirror_types::{FileOperation, Result, TransferMode};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Copies a file, overwriting the destination if it exists
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyFileOperation;

impl FileOperation for CopyFileOperation {
    fn execute(&self, source: &Path, destination: &Path) -> Result<()> {
        let bytes = fs::copy(source, destination)?;
        debug!(
            "Copied {} bytes from '{}' to '{}'",
            bytes,
            source.display(),
            destination.display()
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "Copy"
    }
}

/// Moves a file, falling back to copy and delete when a rename is not possible
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveFileOperation;

impl FileOperation for MoveFileOperation {
    fn execute(&self, source: &Path, destination: &Path) -> Result<()> {
        if let Err(e) = fs::rename(source, destination) {
            debug!(
                "Rename of '{}' failed ({}), copying instead",
                source.display(),
                e
            );
            fs::copy(source, destination)?;
            fs::remove_file(source)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Move"
    }
}

/// Strategy implementing a built-in transfer mode
pub fn for_mode(mode: TransferMode) -> Arc<dyn FileOperation> {
    match mode {
        TransferMode::Copy => Arc::new(CopyFileOperation),
        TransferMode::Move => Arc::new(MoveFileOperation),
    }
}
