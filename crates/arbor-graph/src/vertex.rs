// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Vertex trait and the generic [`SimpleVertex`] wrapper.

use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// A vertex of a [`DependencyGraph`](crate::DependencyGraph).
///
/// Vertices are deduplicated by [`Vertex::key`]: adding a second vertex with
/// an existing key returns the id of the first.
pub trait Vertex {
    type Key: Eq + Hash;

    fn key(&self) -> Self::Key;

    /// True if the vertex can be closed as soon as its dependencies are,
    /// without being handed to the caller in a closure.
    fn can_resolve(&self) -> bool {
        false
    }

    /// Called once when the vertex is closed.
    fn resolve(&mut self) {}
}

/// A vertex wrapping a plain value, keyed by that value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleVertex<T> {
    value: T,
    #[serde(default)]
    auto_resolve: bool,
    #[serde(skip)]
    resolved: usize,
}

impl<T> SimpleVertex<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            auto_resolve: false,
            resolved: 0,
        }
    }

    /// A vertex that closes itself once its dependencies are closed.
    pub fn auto_resolving(value: T) -> Self {
        Self::new(value).with_auto_resolve(true)
    }

    pub fn with_auto_resolve(mut self, auto_resolve: bool) -> Self {
        self.auto_resolve = auto_resolve;
        self
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    /// How many times `resolve` was called.
    pub fn resolved_count(&self) -> usize {
        self.resolved
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved > 0
    }
}

impl<T: Clone + Eq + Hash> Vertex for SimpleVertex<T> {
    type Key = T;

    fn key(&self) -> T {
        self.value.clone()
    }

    fn can_resolve(&self) -> bool {
        self.auto_resolve
    }

    fn resolve(&mut self) {
        self.resolved += 1;
    }
}

impl<T> From<T> for SimpleVertex<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}
