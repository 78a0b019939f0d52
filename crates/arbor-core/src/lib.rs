// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Core infrastructure for arbor.
//!
//! This crate provides the generic, single-threaded engine:
//! - Traversal control signals and the traverser context
//! - Depth-first and breadth-first traversal with cycle detection
//! - The node adapter trait that domain tree types implement
//! - Zippers and multi-zippers for immutable tree edits
//! - The tree transformer that folds visitor edits into a new root
//! - Error types and configuration
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use arbor_core::{FnVisitor, NamedChildren, TraversalControl, Traverser, TraverserContext};
//!
//! struct Item {
//!     name: &'static str,
//!     parts: Vec<Arc<Item>>,
//! }
//!
//! let tree = Arc::new(Item {
//!     name: "car",
//!     parts: vec![
//!         Arc::new(Item { name: "wheel", parts: vec![] }),
//!         Arc::new(Item { name: "door", parts: vec![] }),
//!     ],
//! });
//!
//! let mut names = Vec::new();
//! let mut visitor = FnVisitor::new().on_enter(|ctx: &mut TraverserContext<'_, Arc<Item>>| {
//!     names.push(ctx.this_node().name);
//!     TraversalControl::Continue
//! });
//! Traverser::depth_first(|item: &Arc<Item>| NamedChildren::unnamed(item.parts.clone()))
//!     .traverse(tree, &mut visitor);
//! drop(visitor);
//! assert_eq!(names, vec!["car", "wheel", "door"]);
//! ```

// ============================================================================
// Public modules and re-exports
// ============================================================================

pub mod adapter;
pub mod children;
pub mod context;
pub mod control;
pub mod edit;
pub mod error;
pub mod identity;
pub mod options;
pub mod transformer;
pub mod traverser;
pub mod vars;
pub mod zipper;

/// Fixture trees and logging setup for tests.
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use adapter::NodeAdapter;
pub use children::{Breadcrumb, GroupName, NamedChildren, NodeLocation};
pub use context::{ContextId, ContextView, Phase, TraverserContext};
pub use control::TraversalControl;
pub use edit::{apply_child_edits, ChildEdit, ModificationType};
pub use error::{ArborError, ArborResult, ErrorClass};
pub use identity::{NodeArena, NodeId, NodeIdentity, NodeIndex};
pub use options::{TraversalOrder, TraverserOptions};
pub use transformer::TreeTransformer;
pub use traverser::{FnVisitor, Traverser, TraverserResult, TraverserVisitor};
pub use vars::{SyncVars, Vars};
pub use zipper::{NodeMultiZipper, NodeZipper};
