//! Core type system and error handling for DirMirror
//!
//! This crate provides the foundational types shared by the DirMirror crates:
//!
//! - **Error handling**: one error enum covering validation, enumeration, directory
//!   creation and file transfer failures, with kinds and severity levels
//! - **Core types**: the validated [`DirectoryPair`] and [`ReplicationStats`]
//! - **Traits**: the [`FileOperation`] strategy used by the replication engine
//!
//! # Features
//!
//! - `std` (default): Enable standard library features
//! - `serde`: Enable serialization support
//!
//! # Examples
//!
//! ```rust
//! use dirmirror_types::{DirectoryPair, ErrorKind};
//!
//! let pair = DirectoryPair::new("/definitely/not/here", "/tmp");
//! let error = pair.validate().unwrap_err();
//! assert_eq!(error.kind(), ErrorKind::Validation);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod result;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{Error, ErrorKind, ErrorSeverity};
pub use result::Result;
pub use traits::*;
pub use types::*;
