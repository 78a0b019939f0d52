// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Fork-join parallel traversal for arbor trees.
//!
//! [`ParallelTraverser`] and [`ParallelTransformer`] walk a tree on a rayon
//! pool. Once a node's `enter` returns `Continue`, each child subtree runs as
//! its own task; the node's `leave` (and, for the transformer, the merge of
//! its children's edits) waits until every child task has joined.
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use arbor_core::{NamedChildren, TraversalControl};
//! use arbor_parallel::{ParallelContext, ParallelFnVisitor, ParallelTraverser};
//!
//! struct Dir {
//!     files: usize,
//!     subdirs: Vec<Arc<Dir>>,
//! }
//!
//! let leaf = |files| Arc::new(Dir { files, subdirs: vec![] });
//! let root = Arc::new(Dir { files: 1, subdirs: vec![leaf(2), leaf(3)] });
//!
//! let total = AtomicUsize::new(0);
//! let visitor = ParallelFnVisitor::new().on_enter(|ctx: &mut ParallelContext<'_, Arc<Dir>>| {
//!     total.fetch_add(ctx.this_node().files, Ordering::Relaxed);
//!     TraversalControl::Continue
//! });
//! ParallelTraverser::new(|dir: &Arc<Dir>| NamedChildren::unnamed(dir.subdirs.clone()))
//!     .traverse(root, &visitor)
//!     .unwrap();
//! assert_eq!(total.load(Ordering::Relaxed), 6);
//! ```

// ============================================================================
// Public modules and re-exports
// ============================================================================

pub mod context;
pub mod options;
pub mod transformer;
pub mod traverser;
pub mod visitor;

mod walk;

pub use context::ParallelContext;
pub use options::ParallelOptions;
pub use transformer::ParallelTransformer;
pub use traverser::{ParallelTraverseResult, ParallelTraverser};
pub use visitor::{ParallelFnVisitor, ParallelVisitor};
