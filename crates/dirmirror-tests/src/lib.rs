//! DirMirror integration testing support
//!
//! This crate holds the cross-crate integration tests for DirMirror together
//! with the fixture helpers they share.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Unified test utilities
///
/// Fixture builders and tree inspection helpers used by the integration tests.
pub mod test_utils;
