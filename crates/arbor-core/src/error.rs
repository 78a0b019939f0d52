// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Error types for arbor operations.
//!
//! Only *runtime* failures are represented here: lookups that reference a
//! child location that does not exist, and worker pool construction. Caller
//! misuse (returning `Quit` from a parallel visitor, deleting the root,
//! an online topological sort hitting a cycle, ...) is a programming error
//! and panics with a descriptive message instead of producing an
//! [`ArborError`].
//!
//! Back references found while walking a cyclic graph are not errors either;
//! they are delivered to the visitor through `back_ref`.

use std::fmt;

use thiserror::Error;

use crate::children::GroupName;

// ============================================================================
// Error Classes
// ============================================================================

/// Coarse classification of an [`ArborError`].
///
/// Hosts that map arbor failures onto their own error taxonomy can match on
/// the class instead of every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// A child lookup referenced a group or index that does not exist.
    Lookup,
    /// The runtime environment could not be set up (e.g. worker pool).
    Runtime,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorClass::Lookup => write!(f, "lookup"),
            ErrorClass::Runtime => write!(f, "runtime"),
        }
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for arbor operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArborError {
    /// A location pointed past the end of a child group.
    #[error("no child at {group}[{index}]: group has {len} children")]
    ChildOutOfBounds {
        group: GroupName,
        index: usize,
        len: usize,
    },

    /// A location named a child group the node does not have.
    #[error("node has no child group {group}")]
    UnknownGroup { group: GroupName },

    /// The dedicated worker pool could not be built.
    #[error("worker pool error: {message}")]
    WorkerPool { message: String },
}

/// Result type for arbor operations.
pub type ArborResult<T> = Result<T, ArborError>;

// ============================================================================
// Class Mapping
// ============================================================================

impl From<&ArborError> for ErrorClass {
    fn from(err: &ArborError) -> Self {
        match err {
            ArborError::ChildOutOfBounds { .. } => ErrorClass::Lookup,
            ArborError::UnknownGroup { .. } => ErrorClass::Lookup,
            ArborError::WorkerPool { .. } => ErrorClass::Runtime,
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl ArborError {
    /// Create an out-of-bounds error for `group[index]`.
    pub fn out_of_bounds(group: GroupName, index: usize, len: usize) -> Self {
        ArborError::ChildOutOfBounds { group, index, len }
    }

    /// Create an unknown-group error.
    pub fn unknown_group(group: GroupName) -> Self {
        ArborError::UnknownGroup { group }
    }

    /// Create a worker pool error.
    pub fn worker_pool(message: impl Into<String>) -> Self {
        ArborError::WorkerPool {
            message: message.into(),
        }
    }

    /// Get the class of this error.
    pub fn class(&self) -> ErrorClass {
        ErrorClass::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
