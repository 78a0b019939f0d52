// Copyright (c) The arbor contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Node identity.
//!
//! Cycle detection and zipper merging need to know whether two values are
//! *the same node*, not whether they are structurally equal. Arbor never
//! infers this from `PartialEq`; instead every node type provides a
//! [`NodeId`] through the [`NodeIdentity`] trait.
//!
//! Two encodings are supported out of the box:
//!
//! - **Shared pointers** (`Arc<T>`, `Rc<T>`, `&T`): the identity is the
//!   address of the pointee, so clones of one `Arc` are the same node and a
//!   rebuilt node is a new one.
//! - **Arena indices** ([`NodeIndex`] into a [`NodeArena`]): "same node"
//!   means "same index". This is the natural encoding for graphs that contain
//!   cycles (schema type graphs, for example), which cannot be expressed as
//!   owned trees.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::rc::Rc;
use std::sync::Arc;

/// Identity key of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

/// Provides the identity of a node value.
pub trait NodeIdentity {
    /// Returns the identity of this node.
    fn node_id(&self) -> NodeId;

    /// Returns true if `self` and `other` are the same node.
    fn same_node(&self, other: &Self) -> bool {
        self.node_id() == other.node_id()
    }
}

impl<T: ?Sized> NodeIdentity for Arc<T> {
    fn node_id(&self) -> NodeId {
        NodeId(Arc::as_ptr(self) as *const () as usize)
    }
}

impl<T: ?Sized> NodeIdentity for Rc<T> {
    fn node_id(&self) -> NodeId {
        NodeId(Rc::as_ptr(self) as *const () as usize)
    }
}

impl<T: ?Sized> NodeIdentity for &T {
    fn node_id(&self) -> NodeId {
        NodeId(*self as *const T as *const () as usize)
    }
}

// ============================================================================
// Arena
// ============================================================================

/// Index of a node stored in a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub usize);

impl NodeIdentity for NodeIndex {
    fn node_id(&self) -> NodeId {
        NodeId(self.0)
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Append-only storage for nodes addressed by [`NodeIndex`].
///
/// Nodes are never removed, so an index stays valid for the lifetime of the
/// arena. Edges between nodes are whatever the caller stores inside `T`
/// (typically `Vec<NodeIndex>`), which makes cyclic graphs trivial to build.
#[derive(Debug, Clone)]
pub struct NodeArena<T> {
    nodes: Vec<T>,
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<T> NodeArena<T> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a node and return its index.
    pub fn alloc(&mut self, node: T) -> NodeIndex {
        self.nodes.push(node);
        NodeIndex(self.nodes.len() - 1)
    }

    /// Get a node by index.
    pub fn get(&self, index: NodeIndex) -> Option<&T> {
        self.nodes.get(index.0)
    }

    /// Get a node mutably by index.
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut T> {
        self.nodes.get_mut(index.0)
    }

    /// Number of stored nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over `(index, node)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &T)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeIndex(i), n))
    }
}

impl<T> Index<NodeIndex> for NodeArena<T> {
    type Output = T;

    fn index(&self, index: NodeIndex) -> &T {
        &self.nodes[index.0]
    }
}

impl<T> IndexMut<NodeIndex> for NodeArena<T> {
    fn index_mut(&mut self, index: NodeIndex) -> &mut T {
        &mut self.nodes[index.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arc_clones_share_identity() {
        let a = Arc::new(String::from("a"));
        let b = Arc::clone(&a);
        assert!(a.same_node(&b));
    }

    #[test]
    fn equal_arcs_are_distinct_nodes() {
        let a = Arc::new(String::from("a"));
        let b = Arc::new(String::from("a"));
        assert_eq!(a, b);
        assert!(!a.same_node(&b));
    }

    #[test]
    fn rc_identity() {
        let a = Rc::new(1);
        let b = Rc::clone(&a);
        let c = Rc::new(1);
        assert_eq!(a.node_id(), b.node_id());
        assert_ne!(a.node_id(), c.node_id());
    }

    #[test]
    fn reference_identity() {
        let values = [1, 1];
        let a = &values[0];
        let b = &values[1];
        assert!(a.same_node(&&values[0]));
        assert!(!a.same_node(&b));
    }

    #[test]
    fn arena_index_identity() {
        let mut arena = NodeArena::new();
        let a = arena.alloc("a");
        let b = arena.alloc("a");
        assert_ne!(a.node_id(), b.node_id());
        assert_eq!(a.node_id(), NodeIndex(0).node_id());
        assert_eq!(arena[b], "a");
        assert_eq!(arena.len(), 2);
        assert!(!arena.is_empty());
    }

    #[test]
    fn arena_get_out_of_range() {
        let arena: NodeArena<u8> = NodeArena::new();
        assert!(arena.get(NodeIndex(0)).is_none());
        assert!(arena.is_empty());
    }
}
