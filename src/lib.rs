// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! arbor: generic tree traversal, zipper-based transformation and
//! dependency ordering.
//!
//! The engine is generic over a caller-owned node type. Traversal only needs
//! a child-extraction function; rewriting needs a [`NodeAdapter`]. Trees are
//! never mutated in place: edits are collected as zippers and folded into a
//! new root that shares every untouched subtree with the old one.
//!
//! - [`Traverser`] and [`TreeTransformer`] run on the calling thread.
//! - [`parallel`] walks child subtrees as fork-join tasks on a rayon pool.
//! - [`graph`] orders the vertices of a dependency graph in closures.

// Core infrastructure - re-exported from arbor-core
pub use arbor_core::adapter;
pub use arbor_core::children;
pub use arbor_core::context;
pub use arbor_core::control;
pub use arbor_core::edit;
pub use arbor_core::error;
pub use arbor_core::identity;
pub use arbor_core::options;
pub use arbor_core::transformer;
pub use arbor_core::traverser;
pub use arbor_core::vars;
pub use arbor_core::zipper;

pub use arbor_core::{
    apply_child_edits, ArborError, ArborResult, Breadcrumb, ChildEdit, ContextId, ContextView,
    ErrorClass, FnVisitor, GroupName, ModificationType, NamedChildren, NodeAdapter, NodeArena,
    NodeId, NodeIdentity, NodeIndex, NodeLocation, NodeMultiZipper, NodeZipper, Phase,
    SyncVars, TraversalControl, TraversalOrder, Traverser, TraverserContext, TraverserOptions,
    TraverserResult, TraverserVisitor, TreeTransformer, Vars,
};

// Fork-join traversal and transformation
pub use arbor_parallel as parallel;

// Dependency ordering
pub use arbor_graph as graph;
