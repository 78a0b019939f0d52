// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Dependency graphs with an online topological iterator.
//!
//! Build a [`DependencyGraph`] of your own [`Vertex`] type (or wrap plain
//! values in [`SimpleVertex`]), then drive [`DependencyGraph::order_dependencies`]:
//! each step yields the vertices whose dependencies are all closed.
//!
//! ```
//! use arbor_graph::{DependencyGraph, SimpleVertex};
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_dependency(SimpleVertex::new("link"), SimpleVertex::new("compile"));
//! graph.add_dependency(SimpleVertex::new("compile"), SimpleVertex::new("fetch"));
//!
//! let mut steps = Vec::new();
//! for closure in graph.order_dependencies() {
//!     steps.push(closure.len());
//! }
//! assert_eq!(steps, vec![1, 1, 1]);
//! assert!(graph.vertices().all(|(_, vertex)| vertex.is_resolved()));
//! ```

// ============================================================================
// Public modules and re-exports
// ============================================================================

pub mod graph;
pub mod iter;
pub mod options;
pub mod vertex;

pub use graph::{DependencyGraph, Edge, EdgeAction, EdgeId, VertexId};
pub use iter::TopologicalIter;
pub use options::OrderingOptions;
pub use vertex::{SimpleVertex, Vertex};
