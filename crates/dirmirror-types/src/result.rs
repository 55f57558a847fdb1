//! Result type alias for DirMirror operations

use crate::Error;

/// Result type alias for DirMirror operations
pub type Result<T> = std::result::Result<T, Error>;
