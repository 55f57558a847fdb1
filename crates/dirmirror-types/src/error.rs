//! Error types and handling for DirMirror
//!
//! Every failure the comparator and replication engine can report is a variant of
//! [`Error`]. Variants carry the path involved so the presentation layer can show
//! a useful message without extra context plumbing.

use std::path::{Path, PathBuf};

/// Error severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Low severity - logged and tolerated, the run continues
    Low,
    /// Medium severity - the current run stops, earlier work is kept
    Medium,
    /// High severity - nothing was done, the caller must fix its input
    High,
}

/// Main error type for DirMirror operations
#[derive(thiserror::Error, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// Source or destination root is missing or not a directory
    #[error("Invalid directory '{path}': {reason}")]
    Validation {
        /// Offending path
        path: PathBuf,
        /// Why the path was rejected
        reason: String,
    },

    /// A directory could not be listed
    #[error("Failed to read directory '{path}': {message}")]
    Enumeration {
        /// Directory that could not be listed
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// A destination directory or one of its ancestors could not be created
    #[error("Failed to create directory '{path}': {message}")]
    DirectoryCreation {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying error message
        message: String,
    },

    /// The configured file operation failed for a single file
    #[error("Failed to {operation} file '{path}': {message}")]
    FileTransfer {
        /// Relative path of the file inside the mirrored tree
        path: PathBuf,
        /// Lowercase operation name, e.g. "copy"
        operation: String,
        /// Underlying error message
        message: String,
    },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        /// Error message from the I/O operation
        message: String,
    },

    /// An operation was called out of order
    #[error("Invalid state: {message}")]
    State {
        /// Description of the missing precondition
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Other {
        /// Custom error message
        message: String,
    },
}

/// Error kind for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid source/destination roots
    Validation,
    /// Directory listing failures
    Enumeration,
    /// Destination directory creation failures
    DirectoryCreation,
    /// File copy/move failures
    FileTransfer,
    /// Other I/O related errors
    Io,
    /// Operation called out of order
    State,
    /// Configuration errors
    Config,
    /// Other errors
    Other,
}

impl Error {
    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Enumeration { .. } => ErrorKind::Enumeration,
            Self::DirectoryCreation { .. } => ErrorKind::DirectoryCreation,
            Self::FileTransfer { .. } => ErrorKind::FileTransfer,
            Self::Io { .. } => ErrorKind::Io,
            Self::State { .. } => ErrorKind::State,
            Self::Config { .. } => ErrorKind::Config,
            Self::Other { .. } => ErrorKind::Other,
        }
    }

    /// Get the error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Enumeration { .. } | Self::DirectoryCreation { .. } => ErrorSeverity::Low,
            Self::FileTransfer { .. } | Self::Io { .. } | Self::Other { .. } => {
                ErrorSeverity::Medium
            }
            Self::Validation { .. } | Self::State { .. } | Self::Config { .. } => {
                ErrorSeverity::High
            }
        }
    }

    /// Check if the surrounding traversal can keep going after this error
    pub fn is_recoverable(&self) -> bool {
        self.severity() == ErrorSeverity::Low
    }

    /// Create a new validation error
    pub fn validation<P: AsRef<Path>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::Validation {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create a new enumeration error
    pub fn enumeration<P: AsRef<Path>>(path: P, error: &std::io::Error) -> Self {
        Self::Enumeration {
            path: path.as_ref().to_path_buf(),
            message: error.to_string(),
        }
    }

    /// Create a new directory creation error
    pub fn directory_creation<P: AsRef<Path>>(path: P, error: &std::io::Error) -> Self {
        Self::DirectoryCreation {
            path: path.as_ref().to_path_buf(),
            message: error.to_string(),
        }
    }

    /// Create a new file transfer error
    pub fn file_transfer<P: AsRef<Path>, S: AsRef<str>>(
        path: P,
        operation: S,
        error: &Error,
    ) -> Self {
        let message = match error {
            Self::Io { message } => message.clone(),
            other => other.to_string(),
        };
        Self::FileTransfer {
            path: path.as_ref().to_path_buf(),
            operation: operation.as_ref().to_lowercase(),
            message,
        }
    }

    /// Create a new state error
    pub fn state<S: Into<String>>(message: S) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
        }
    }
}
